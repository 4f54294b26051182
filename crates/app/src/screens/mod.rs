//! Screen models.
//!
//! Each screen owns its local state and talks to the outside world only
//! through the traits in [`crate::ports`]. Handlers take `&mut self`.

mod commands;
mod inventory;
mod locator;

pub use commands::{CompensationPolicy, InventoryCommand, InventoryLists};
pub use inventory::{
    ALL_ASSIGNED_TEXT, AssignedRow, AvailableRow, FETCH_FAILED_TEXT, InventoryManager,
    InventoryPage, InventoryView, NO_ASSIGNED_TEXT, StockAction,
};
pub use locator::{
    CameraSettings, CardAction, Feature, FeatureCollection, FeatureProperties, Point, ShopCard,
    ShopLocator,
};
