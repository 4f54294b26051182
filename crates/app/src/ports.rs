//! Ports for the collaborators the screens talk to.
//!
//! The remote store, the device's location provider, the map camera and the
//! navigation stack all live outside this crate. Screens depend on these
//! traits; [`crate::supabase::SupabaseClient`] implements the store ports and
//! a host application supplies the rest.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stockspot_core::records::{ShopProductRecord, ShopRecord};
use stockspot_core::{Coordinate, Product, ProductId, ShopId};
use thiserror::Error;

use crate::navigation::Route;

/// Failure reported by a store adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The request never produced a response.
    #[error("connection failed: {message}")]
    Connection {
        /// Transport-level detail.
        message: String,
    },

    /// The store answered with an error.
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Backend error message.
        message: String,
    },

    /// The response body did not match the expected rows.
    #[error("unexpected response: {message}")]
    Decode {
        /// Decoder detail.
        message: String,
    },
}

impl StoreError {
    /// Helper for connection failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for backend rejections.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Helper for decode failures.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Read access to shops.
#[async_trait]
pub trait ShopStore: Send + Sync {
    /// All shops with their opening hours embedded.
    async fn list_shops(&self) -> Result<Vec<ShopRecord>, StoreError>;
}

/// Read and write access to a shop's product associations.
///
/// Every method is one independent statement. Nothing is transactional.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Associations of `shop` joined with their products.
    async fn assigned_products(&self, shop: &ShopId)
    -> Result<Vec<ShopProductRecord>, StoreError>;

    /// Every product in the catalog.
    async fn all_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Every product whose ID is not in `excluded`.
    ///
    /// Callers must not pass an empty slice; use [`Self::all_products`].
    async fn products_excluding(&self, excluded: &[ProductId])
    -> Result<Vec<Product>, StoreError>;

    /// Delete the association between `shop` and `product`.
    async fn remove_product(&self, shop: &ShopId, product: &ProductId) -> Result<(), StoreError>;

    /// Overwrite the association's verification stamp.
    async fn set_last_verified(
        &self,
        shop: &ShopId,
        product: &ProductId,
        at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;

    /// Create an association stamped with `at`.
    async fn add_product(
        &self,
        shop: &ShopId,
        product: &ProductId,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

/// Outcome of a location permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

impl PermissionStatus {
    /// Whether the position may be read.
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Failure reading the device position.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("location unavailable: {0}")]
    Unavailable(String),
    #[error("location request timed out")]
    Timeout,
}

/// Device location provider.
#[async_trait]
pub trait Geolocation: Send + Sync {
    /// Ask for foreground location permission.
    async fn request_permission(&self) -> PermissionStatus;

    /// One-shot, high-accuracy position read.
    async fn current_position(&self) -> Result<Coordinate, GeolocationError>;
}

/// A camera move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraUpdate {
    /// New center.
    pub center: Coordinate,
    /// New zoom level.
    pub zoom: f64,
    /// Animation duration.
    pub animation: Duration,
}

/// Handle to the map's camera.
pub trait MapCamera: Send + Sync {
    /// Move the camera. Fire-and-forget.
    fn set_camera(&self, update: CameraUpdate);
}

/// Navigation stack.
pub trait Navigator: Send + Sync {
    /// Push `route`.
    fn navigate(&self, route: Route);
}

/// Source of "now" for stamps and age labels.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_displays_backend_message() {
        let err = StoreError::rejected(400, "invalid input syntax for type uuid");
        assert_eq!(err.to_string(), "invalid input syntax for type uuid");
    }

    #[test]
    fn test_permission_status() {
        assert!(PermissionStatus::Granted.is_granted());
        assert!(!PermissionStatus::Denied.is_granted());
        assert!(!PermissionStatus::Undetermined.is_granted());
    }
}
