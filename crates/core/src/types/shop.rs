//! Shops, products, and a shop's view of its inventory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::Coordinate;
use super::hours::{DayOfWeek, OpeningHours, hours_label, hours_on};
use super::id::{ProductId, ShopId};

/// A physical shop with a position and weekly opening hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    /// Shop ID.
    pub id: ShopId,
    /// Display name.
    pub name: String,
    /// Map position.
    pub coords: Coordinate,
    /// Opening windows, in the order the store returned them.
    pub hours: Vec<OpeningHours>,
}

impl Shop {
    /// Formatted windows for `day`, or `None` when closed.
    #[must_use]
    pub fn hours_on(&self, day: DayOfWeek) -> Option<String> {
        hours_on(&self.hours, day)
    }

    /// Card label for `day`.
    #[must_use]
    pub fn hours_label(&self, day: DayOfWeek) -> String {
        hours_label(&self.hours, day)
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Object path inside the public image bucket. Nullable column.
    #[serde(default)]
    pub image_path: Option<String>,
}

/// A product as stocked by a particular shop.
///
/// `last_verified_at` lives on the shop/product association, not on the
/// product itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryProduct {
    /// The catalog product.
    #[serde(flatten)]
    pub product: Product,
    /// When someone last confirmed the product on the shelf.
    pub last_verified_at: Option<DateTime<Utc>>,
}

impl InventoryProduct {
    /// Associate `product` with a verification stamp.
    #[must_use]
    pub const fn new(product: Product, last_verified_at: Option<DateTime<Utc>>) -> Self {
        Self {
            product,
            last_verified_at,
        }
    }

    /// Product ID.
    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.product.id
    }
}
