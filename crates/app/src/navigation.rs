//! Routes between the two screens.
//!
//! Navigation carries a string-keyed parameter bag, the same shape a
//! file-based router hands to the target screen.

use std::collections::BTreeMap;

use stockspot_core::ShopId;

/// Path of the inventory screen.
pub const MANAGE_INVENTORY_PATH: &str = "/manage_inventory/[id]";

/// A navigable screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// The map and shop list.
    ShopLocator,
    /// Inventory of one shop.
    ManageInventory {
        /// Shop being managed.
        shop_id: ShopId,
        /// Shop name, for the screen title.
        name: String,
    },
}

impl Route {
    /// Router path.
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::ShopLocator => "/",
            Self::ManageInventory { .. } => MANAGE_INVENTORY_PATH,
        }
    }

    /// Parameter bag sent with the route.
    #[must_use]
    pub fn params(&self) -> BTreeMap<String, String> {
        match self {
            Self::ShopLocator => BTreeMap::new(),
            Self::ManageInventory { shop_id, name } => BTreeMap::from([
                ("id".to_string(), shop_id.to_string()),
                ("name".to_string(), name.clone()),
            ]),
        }
    }
}

/// Inputs the inventory screen reads back from navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryParams {
    /// Shop to manage. `None` when the screen was opened without one.
    pub shop_id: Option<ShopId>,
    /// Shop name for the title.
    pub name: Option<String>,
}

impl InventoryParams {
    /// Read the `id` and `name` keys. Blank values count as absent.
    #[must_use]
    pub fn from_params(params: &BTreeMap<String, String>) -> Self {
        let non_blank = |key: &str| params.get(key).filter(|v| !v.trim().is_empty()).cloned();

        Self {
            shop_id: non_blank("id").map(ShopId::from),
            name: non_blank("name"),
        }
    }
}

impl From<&Route> for InventoryParams {
    fn from(route: &Route) -> Self {
        Self::from_params(&route.params())
    }
}
