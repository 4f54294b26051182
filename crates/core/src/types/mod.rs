//! Core types for Stockspot.
//!
//! This module provides type-safe wrappers for the domain concepts shared by
//! the locator and inventory screens.

pub mod geo;
pub mod hours;
pub mod id;
pub mod shop;

pub use geo::Coordinate;
pub use hours::{CLOSED_TODAY, DayOfWeek, HoursError, OpeningHours, TimeOfDay};
pub use id::*;
pub use shop::{InventoryProduct, Product, Shop};
