//! Store ports backed by the REST client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stockspot_core::records::{LastVerifiedPatch, NewShopProduct, ShopProductRecord, ShopRecord};
use stockspot_core::{Product, ProductId, ShopId};
use tracing::instrument;

use super::{Filter, Query, SupabaseClient, Table};
use crate::ports::{InventoryStore, ShopStore, StoreError};

/// Shops with their hours embedded under `hours`.
pub(crate) const SHOPS_SELECT: &str = "*,hours:shop_hours(*)";

/// Associations with their product embedded under `product`.
pub(crate) const SHOP_PRODUCTS_SELECT: &str = "*,product:products(*)";

/// The association row for one shop and product.
fn association(shop: &ShopId, product: &ProductId) -> Query {
    Query::new(Table::ShopProducts)
        .eq("product_id", product.as_str())
        .eq("shop_id", shop.as_str())
}

#[async_trait]
impl ShopStore for SupabaseClient {
    #[instrument(skip(self))]
    async fn list_shops(&self) -> Result<Vec<ShopRecord>, StoreError> {
        let query = Query::new(Table::Shops).select(SHOPS_SELECT);
        Ok(self.select(&query).await?)
    }
}

#[async_trait]
impl InventoryStore for SupabaseClient {
    #[instrument(skip(self), fields(shop_id = %shop))]
    async fn assigned_products(
        &self,
        shop: &ShopId,
    ) -> Result<Vec<ShopProductRecord>, StoreError> {
        let query = Query::new(Table::ShopProducts)
            .select(SHOP_PRODUCTS_SELECT)
            .eq("shop_id", shop.as_str());
        Ok(self.select(&query).await?)
    }

    #[instrument(skip(self))]
    async fn all_products(&self) -> Result<Vec<Product>, StoreError> {
        let query = Query::new(Table::Products).select("*");
        Ok(self.select(&query).await?)
    }

    #[instrument(skip(self, excluded), fields(excluded = excluded.len()))]
    async fn products_excluding(
        &self,
        excluded: &[ProductId],
    ) -> Result<Vec<Product>, StoreError> {
        let Some(filter) = Filter::not_in("id", excluded.iter().map(ProductId::as_str)) else {
            return self.all_products().await;
        };

        let query = Query::new(Table::Products).select("*").filter(filter);
        Ok(self.select(&query).await?)
    }

    #[instrument(skip(self), fields(shop_id = %shop, product_id = %product))]
    async fn remove_product(&self, shop: &ShopId, product: &ProductId) -> Result<(), StoreError> {
        Ok(self.delete(&association(shop, product)).await?)
    }

    #[instrument(skip(self), fields(shop_id = %shop, product_id = %product))]
    async fn set_last_verified(
        &self,
        shop: &ShopId,
        product: &ProductId,
        at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        let patch = LastVerifiedPatch {
            last_verified_at: at,
        };
        Ok(self.update(&association(shop, product), &patch).await?)
    }

    #[instrument(skip(self), fields(shop_id = %shop, product_id = %product))]
    async fn add_product(
        &self,
        shop: &ShopId,
        product: &ProductId,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let row = NewShopProduct {
            shop_id: shop.clone(),
            product_id: product.clone(),
            last_verified_at: at,
        };
        Ok(self.insert(Table::ShopProducts, &row).await?)
    }
}
