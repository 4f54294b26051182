//! Row shapes exchanged with the remote store.
//!
//! Field names follow the table columns. Nested relations use the aliases
//! the select strings ask for (`hours:shop_hours(*)`, `product:products(*)`).
//! Extra columns are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    Coordinate, DayOfWeek, InventoryProduct, OpeningHours, Product, ProductId, Shop, ShopId,
    TimeOfDay,
};

/// A `shops` row with its `shop_hours` embedded as `hours`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopRecord {
    /// Shop ID.
    pub id: ShopId,
    /// Display name.
    pub name: String,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Embedded `shop_hours` rows.
    #[serde(default)]
    pub hours: Vec<ShopHoursRecord>,
}

/// A `shop_hours` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopHoursRecord {
    /// Sunday-based day index.
    pub day_of_week: DayOfWeek,
    /// Opening time (the store sends `HH:MM:SS`).
    pub open_time: TimeOfDay,
    /// Closing time.
    pub close_time: TimeOfDay,
}

impl From<ShopHoursRecord> for OpeningHours {
    fn from(row: ShopHoursRecord) -> Self {
        Self {
            day_of_week: row.day_of_week,
            open_time: row.open_time,
            close_time: row.close_time,
        }
    }
}

impl From<ShopRecord> for Shop {
    fn from(row: ShopRecord) -> Self {
        Self {
            id: row.id,
            name: row.name,
            coords: Coordinate::new(row.longitude, row.latitude),
            hours: row.hours.into_iter().map(OpeningHours::from).collect(),
        }
    }
}

/// A `shop_products` row with its `products` row embedded as `product`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopProductRecord {
    /// Owning shop.
    pub shop_id: ShopId,
    /// Associated product.
    pub product_id: ProductId,
    /// Verification stamp on the association.
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub last_verified_at: Option<DateTime<Utc>>,
    /// Embedded product.
    pub product: Product,
}

impl From<ShopProductRecord> for InventoryProduct {
    fn from(row: ShopProductRecord) -> Self {
        Self::new(row.product, row.last_verified_at)
    }
}

/// Insert payload for a new `shop_products` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewShopProduct {
    /// Owning shop.
    pub shop_id: ShopId,
    /// Product being stocked.
    pub product_id: ProductId,
    /// Initial verification stamp.
    #[serde(serialize_with = "timestamp::serialize")]
    pub last_verified_at: DateTime<Utc>,
}

/// Update payload for `shop_products.last_verified_at`.
///
/// `None` is sent as an explicit JSON `null` so an undo can clear the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LastVerifiedPatch {
    /// New stamp.
    #[serde(serialize_with = "timestamp::serialize_option")]
    pub last_verified_at: Option<DateTime<Utc>>,
}

/// Timestamp wire format.
///
/// Writes use RFC 3339 with millisecond precision and a `Z` suffix. Reads
/// accept any RFC 3339 offset, and a bare `timestamp` without zone is read as
/// UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Render a timestamp the way writes send it.
    #[must_use]
    pub fn format(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Parse a timestamp as returned by the store.
    ///
    /// # Errors
    ///
    /// Returns the chrono parse error when neither RFC 3339 nor a naive
    /// `YYYY-MM-DDTHH:MM:SS[.f]` form matches.
    pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s)
            .map(|at| at.with_timezone(&Utc))
            .or_else(|_| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                    .map(|naive| naive.and_utc())
            })
    }

    pub(crate) fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format(at))
    }

    #[allow(clippy::ref_option)] // serde's serialize_with passes &Option<T>
    pub(crate) fn serialize_option<S: Serializer>(
        at: &Option<DateTime<Utc>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match at {
            Some(at) => s.serialize_str(&format(at)),
            None => s.serialize_none(),
        }
    }

    pub(crate) fn deserialize_option<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|raw| parse(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_shop_record_projection() {
        let row: ShopRecord = serde_json::from_value(json!({
            "id": "shop-1",
            "name": "Corner Grocer",
            "longitude": 4.9,
            "latitude": 52.37,
            "created_at": "2025-01-01T00:00:00+00:00",
            "hours": [
                { "id": 11, "shop_id": "shop-1", "day_of_week": 1, "open_time": "08:00:00", "close_time": "17:30:00" }
            ]
        }))
        .unwrap();

        let shop = Shop::from(row);
        assert_eq!(shop.coords.as_lng_lat(), [4.9, 52.37]);
        assert_eq!(shop.hours.len(), 1);
        assert_eq!(shop.hours.first().unwrap().to_string(), "08:00 - 17:30");
    }

    #[test]
    fn test_shop_record_without_hours() {
        let row: ShopRecord = serde_json::from_value(json!({
            "id": 3, "name": "Kiosk", "longitude": 0.0, "latitude": 0.0
        }))
        .unwrap();
        assert_eq!(row.id.as_str(), "3");
        assert!(row.hours.is_empty());
    }

    #[test]
    fn test_bad_hours_row_fails_decode() {
        let result = serde_json::from_value::<ShopRecord>(json!({
            "id": "s", "name": "n", "longitude": 0.0, "latitude": 0.0,
            "hours": [{ "day_of_week": 8, "open_time": "08:00:00", "close_time": "09:00:00" }]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_shop_product_record_takes_stamp_from_association() {
        let row: ShopProductRecord = serde_json::from_value(json!({
            "shop_id": "shop-1",
            "product_id": "p-1",
            "last_verified_at": "2025-03-04T10:00:00.5+00:00",
            "product": { "id": "p-1", "name": "Oat milk", "image_path": "oat.png" }
        }))
        .unwrap();

        let item = InventoryProduct::from(row);
        assert_eq!(item.id().as_str(), "p-1");
        assert_eq!(
            item.last_verified_at.unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 4, 10, 0, 0).unwrap()
                + chrono::Duration::milliseconds(500)
        );
    }

    #[test]
    fn test_shop_product_record_null_stamp() {
        let row: ShopProductRecord = serde_json::from_value(json!({
            "shop_id": "shop-1",
            "product_id": "p-2",
            "last_verified_at": null,
            "product": { "id": "p-2", "name": "Rye bread", "image_path": "rye.png" }
        }))
        .unwrap();
        assert!(row.last_verified_at.is_none());
    }

    #[test]
    fn test_product_image_path_may_be_null_or_missing() {
        let null_path: Product =
            serde_json::from_value(json!({ "id": "p", "name": "n", "image_path": null })).unwrap();
        assert_eq!(null_path.image_path, None);

        let missing: Product = serde_json::from_value(json!({ "id": "p", "name": "n" })).unwrap();
        assert_eq!(missing.image_path, None);

        let row: ShopProductRecord = serde_json::from_value(json!({
            "shop_id": "shop-1",
            "product_id": "p-3",
            "last_verified_at": null,
            "product": { "id": "p-3", "name": "Coffee beans", "image_path": null }
        }))
        .unwrap();
        assert_eq!(InventoryProduct::from(row).product.image_path, None);
    }

    #[test]
    fn test_naive_timestamp_read_as_utc() {
        let at = timestamp::parse("2025-06-01T12:30:00").unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_patch_serializes_explicit_null() {
        let patch = LastVerifiedPatch {
            last_verified_at: None,
        };
        assert_eq!(
            serde_json::to_value(patch).unwrap(),
            json!({ "last_verified_at": null })
        );
    }

    #[test]
    fn test_insert_payload_uses_millis() {
        let row = NewShopProduct {
            shop_id: ShopId::new("s"),
            product_id: ProductId::new("p"),
            last_verified_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
        };
        assert_eq!(
            serde_json::to_value(row).unwrap(),
            json!({
                "shop_id": "s",
                "product_id": "p",
                "last_verified_at": "2025-01-02T03:04:05.000Z"
            })
        );
    }
}
