//! Inventory manager: one shop's assigned products and the rest of the catalog.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use stockspot_core::format::last_verified_label;
use stockspot_core::{InventoryProduct, Product, ProductId, ShopId};
use tracing::instrument;

use super::commands::{CompensationPolicy, InventoryCommand, InventoryLists};
use crate::error::{AppError, Result};
use crate::images::ImageUrls;
use crate::navigation::InventoryParams;
use crate::ports::{Clock, InventoryStore, SystemClock};

/// Shown when the assigned list is empty.
pub const NO_ASSIGNED_TEXT: &str = "No products assigned to this shop.";

/// Shown when every catalog product is assigned.
pub const ALL_ASSIGNED_TEXT: &str = "All products are assigned to this shop.";

/// Screen error when the backend gives no message.
pub const FETCH_FAILED_TEXT: &str = "Failed to fetch products";

/// Which stock button an assigned row shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StockAction {
    /// "In stock": stamp the product as verified now.
    InStock,
    /// "Undo": restore the stamp from before the last "In stock".
    Undo,
}

impl StockAction {
    /// Button label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InStock => "In stock",
            Self::Undo => "Undo",
        }
    }
}

/// Row in the assigned list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedRow {
    pub product_id: ProductId,
    pub name: String,
    /// `None` when the product has no image.
    pub image_url: Option<String>,
    /// "Last verified: ..." label.
    pub last_verified: String,
    pub stock_action: StockAction,
}

/// Row in the "add products" list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableRow {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: Option<String>,
}

/// A loaded inventory page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryPage {
    /// "Manage Inventory for {name}".
    pub title: String,
    pub assigned: Vec<AssignedRow>,
    pub available: Vec<AvailableRow>,
}

impl InventoryPage {
    /// Placeholder for an empty assigned list.
    #[must_use]
    pub fn assigned_placeholder(&self) -> Option<&'static str> {
        self.assigned.is_empty().then_some(NO_ASSIGNED_TEXT)
    }

    /// Placeholder for an empty available list.
    #[must_use]
    pub fn available_placeholder(&self) -> Option<&'static str> {
        self.available.is_empty().then_some(ALL_ASSIGNED_TEXT)
    }
}

/// What the screen renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryView {
    /// No shop ID was passed. Terminal.
    NoShopSelected,
    /// A load started and never finished, as when its future is dropped
    /// mid-read. Persists until the next `load`.
    Loading,
    Error(String),
    Ready(InventoryPage),
}

/// State and handlers of the inventory screen for one shop.
pub struct InventoryManager {
    store: Arc<dyn InventoryStore>,
    clock: Arc<dyn Clock>,
    images: ImageUrls,
    policy: CompensationPolicy,
    shop_id: Option<ShopId>,
    shop_name: Option<String>,
    lists: InventoryLists,
    loading: bool,
    error: Option<String>,
}

impl std::fmt::Debug for InventoryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryManager")
            .field("shop_id", &self.shop_id)
            .field("policy", &self.policy)
            .field("lists", &self.lists)
            .field("loading", &self.loading)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl InventoryManager {
    /// Screen for the shop named by navigation `params`.
    #[must_use]
    pub fn new(store: Arc<dyn InventoryStore>, images: ImageUrls, params: InventoryParams) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            images,
            policy: CompensationPolicy::default(),
            shop_id: params.shop_id,
            shop_name: params.name,
            lists: InventoryLists::default(),
            loading: false,
            error: None,
        }
    }

    /// Replace the clock used for stamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the rollback policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: CompensationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Shop being managed.
    #[must_use]
    pub const fn shop_id(&self) -> Option<&ShopId> {
        self.shop_id.as_ref()
    }

    /// Products stocked by the shop.
    #[must_use]
    pub fn assigned(&self) -> &[InventoryProduct] {
        &self.lists.assigned
    }

    /// Catalog products the shop does not stock.
    #[must_use]
    pub fn remaining(&self) -> &[Product] {
        &self.lists.remaining
    }

    /// Screen-level error from the last load.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a load is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Read assigned products, then the rest of the catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NoShopSelected` without a shop, or the first read
    /// failure. On failure the screen error is set and the lists are kept.
    /// On success the lists are replaced and pending undo entries dropped.
    #[instrument(skip(self), fields(shop_id))]
    pub async fn load(&mut self) -> Result<()> {
        let shop = self.shop_id.clone().ok_or(AppError::NoShopSelected)?;
        tracing::Span::current().record("shop_id", tracing::field::display(&shop));

        self.loading = true;
        self.error = None;
        let result = self.read_lists(&shop).await;
        self.loading = false;

        match result {
            Ok((assigned, remaining)) => {
                tracing::debug!(
                    assigned = assigned.len(),
                    remaining = remaining.len(),
                    "Inventory loaded"
                );
                self.lists.assigned = assigned;
                self.lists.remaining = remaining;
                self.lists.undo.clear();
                Ok(())
            }
            Err(err) => {
                err.report("load_inventory");
                self.error = Some(err.user_message(FETCH_FAILED_TEXT));
                Err(err)
            }
        }
    }

    async fn read_lists(&self, shop: &ShopId) -> Result<(Vec<InventoryProduct>, Vec<Product>)> {
        let assigned: Vec<InventoryProduct> = self
            .store
            .assigned_products(shop)
            .await?
            .into_iter()
            .map(InventoryProduct::from)
            .collect();

        let remaining = if assigned.is_empty() {
            self.store.all_products().await?
        } else {
            let ids: Vec<ProductId> = assigned.iter().map(|p| p.id().clone()).collect();
            self.store.products_excluding(&ids).await?
        };

        Ok((assigned, remaining))
    }

    /// Unassign a product from the shop.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for a product that is not assigned, or
    /// the store error. Local state changes only on success.
    pub async fn remove(&mut self, product_id: &ProductId) -> Result<()> {
        let product = self
            .lists
            .assigned(product_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("assigned product {product_id}")))?;
        self.run(InventoryCommand::Remove { product }).await
    }

    /// "In stock": stamp the product as verified now.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for a product that is not assigned, or
    /// the store error after rolling the stamp back.
    pub async fn mark_in_stock(&mut self, product_id: &ProductId) -> Result<()> {
        let previous = self
            .lists
            .assigned(product_id)
            .ok_or_else(|| AppError::NotFound(format!("assigned product {product_id}")))?
            .last_verified_at;
        self.run(InventoryCommand::MarkInStock {
            product_id: product_id.clone(),
            previous,
            stamped: self.clock.now(),
        })
        .await
    }

    /// "Undo": restore the stamp from before the last "In stock".
    ///
    /// Does nothing when no undo entry exists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for a product that is not assigned, or
    /// the store error.
    pub async fn undo_stock(&mut self, product_id: &ProductId) -> Result<()> {
        let replaced = self
            .lists
            .assigned(product_id)
            .ok_or_else(|| AppError::NotFound(format!("assigned product {product_id}")))?
            .last_verified_at;
        let Some(&restored) = self.lists.undo.get(product_id) else {
            tracing::debug!(product_id = %product_id, "Nothing to undo");
            return Ok(());
        };
        self.run(InventoryCommand::UndoStock {
            product_id: product_id.clone(),
            restored,
            replaced,
        })
        .await
    }

    /// "Out of Stock". Only logged.
    pub fn mark_out_of_stock(&self, product_id: &ProductId) {
        tracing::info!(
            shop_id = ?self.shop_id,
            product_id = %product_id,
            "Out of stock reported"
        );
    }

    /// Assign a catalog product to the shop, stamped now.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for a product that is not in the
    /// remaining list, or the store error. Local state changes only on
    /// success.
    pub async fn add_to_inventory(&mut self, product_id: &ProductId) -> Result<()> {
        let product = self
            .lists
            .remaining(product_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("available product {product_id}")))?;
        self.run(InventoryCommand::Add {
            product,
            stamped: self.clock.now(),
        })
        .await
    }

    /// Which stock button to show for `product_id`.
    #[must_use]
    pub fn stock_action(&self, product_id: &ProductId) -> StockAction {
        if self.lists.undo.contains_key(product_id) {
            StockAction::Undo
        } else {
            StockAction::InStock
        }
    }

    /// Render state at `now`.
    #[must_use]
    pub fn view(&self, now: DateTime<Utc>) -> InventoryView {
        let Some(shop_id) = &self.shop_id else {
            return InventoryView::NoShopSelected;
        };
        if self.loading {
            return InventoryView::Loading;
        }
        if let Some(message) = &self.error {
            return InventoryView::Error(message.clone());
        }

        let name = self.shop_name.as_deref().unwrap_or_else(|| shop_id.as_str());
        InventoryView::Ready(InventoryPage {
            title: format!("Manage Inventory for {name}"),
            assigned: self
                .lists
                .assigned
                .iter()
                .map(|item| AssignedRow {
                    product_id: item.id().clone(),
                    name: item.product.name.clone(),
                    image_url: self.images.product_url(&item.product),
                    last_verified: last_verified_label(item.last_verified_at, now),
                    stock_action: self.stock_action(item.id()),
                })
                .collect(),
            available: self
                .lists
                .remaining
                .iter()
                .map(|product| AvailableRow {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    image_url: self.images.product_url(product),
                })
                .collect(),
        })
    }

    async fn run(&mut self, command: InventoryCommand) -> Result<()> {
        let shop = self.shop_id.clone().ok_or(AppError::NoShopSelected)?;

        if command.is_optimistic() {
            command.apply_optimistic(&mut self.lists);
        }

        match command.execute(self.store.as_ref(), &shop).await {
            Ok(()) => {
                command.apply_confirmed(&mut self.lists);
                tracing::info!(
                    shop_id = %shop,
                    product_id = %command.product_id(),
                    command = command.name(),
                    "Inventory updated"
                );
                Ok(())
            }
            Err(e) => {
                if command.is_optimistic() && command.compensates(self.policy) {
                    command.compensate(&mut self.lists);
                    tracing::debug!(command = command.name(), "Local change rolled back");
                }
                let err = AppError::from(e);
                err.report(command.name());
                Err(err)
            }
        }
    }
}
