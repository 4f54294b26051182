//! Inventory commands.
//!
//! Each command loads the shop's inventory first, exactly as the screen does
//! on open, then runs one mutation.
//!
//! # Usage
//!
//! ```bash
//! stockspot inventory show 42 --name "Corner Shop"
//! stockspot inventory add 42 7
//! stockspot inventory in-stock 42 7
//! stockspot inventory remove 42 7
//! stockspot inventory out-of-stock 42 7
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use stockspot_app::AppError;
use stockspot_app::config::AppConfig;
use stockspot_app::images::ImageUrls;
use stockspot_app::navigation::InventoryParams;
use stockspot_app::screens::{InventoryManager, InventoryView};
use stockspot_app::supabase::SupabaseClient;
use stockspot_core::ProductId;

use super::CliError;

/// Build the screen for `shop_id` and load it.
async fn open(
    config: &AppConfig,
    shop_id: &str,
    name: Option<String>,
) -> Result<InventoryManager, CliError> {
    let mut params = BTreeMap::from([("id".to_string(), shop_id.to_string())]);
    if let Some(name) = name {
        params.insert("name".to_string(), name);
    }

    let client = SupabaseClient::new(&config.supabase)?;
    let mut screen = InventoryManager::new(
        Arc::new(client),
        ImageUrls::from(&config.supabase),
        InventoryParams::from_params(&params),
    )
    .with_policy(config.compensation);
    screen.load().await?;
    Ok(screen)
}

/// Print assigned products with their ages, then the available ones.
pub async fn show(config: &AppConfig, shop_id: &str, name: Option<String>) -> Result<(), CliError> {
    let screen = open(config, shop_id, name).await?;

    match screen.view(Utc::now()) {
        InventoryView::NoShopSelected => return Err(AppError::NoShopSelected.into()),
        InventoryView::Loading => tracing::info!("Loading..."),
        InventoryView::Error(message) => tracing::error!("{message}"),
        InventoryView::Ready(page) => {
            tracing::info!("{}", page.title);

            tracing::info!("Assigned products:");
            if let Some(text) = page.assigned_placeholder() {
                tracing::info!("  {text}");
            }
            for row in &page.assigned {
                tracing::info!(
                    "  [{}] {} - {} ({})",
                    row.product_id,
                    row.name,
                    row.last_verified,
                    row.stock_action.label()
                );
            }

            tracing::info!("Add products:");
            if let Some(text) = page.available_placeholder() {
                tracing::info!("  {text}");
            }
            for row in &page.available {
                tracing::info!(
                    "  [{}] {} {}",
                    row.product_id,
                    row.name,
                    row.image_url.as_deref().unwrap_or("(no image)")
                );
            }
        }
    }

    Ok(())
}

/// Assign `product_id` to the shop.
pub async fn add(config: &AppConfig, shop_id: &str, product_id: &str) -> Result<(), CliError> {
    let mut screen = open(config, shop_id, None).await?;
    screen.add_to_inventory(&ProductId::new(product_id)).await?;
    tracing::info!("Added product {product_id} to shop {shop_id}");
    Ok(())
}

/// Unassign `product_id` from the shop.
pub async fn remove(config: &AppConfig, shop_id: &str, product_id: &str) -> Result<(), CliError> {
    let mut screen = open(config, shop_id, None).await?;
    screen.remove(&ProductId::new(product_id)).await?;
    tracing::info!("Removed product {product_id} from shop {shop_id}");
    Ok(())
}

/// Stamp `product_id` as verified now.
pub async fn in_stock(config: &AppConfig, shop_id: &str, product_id: &str) -> Result<(), CliError> {
    let mut screen = open(config, shop_id, None).await?;
    screen.mark_in_stock(&ProductId::new(product_id)).await?;
    tracing::info!("Marked product {product_id} in stock at shop {shop_id}");
    Ok(())
}

/// Report `product_id` as out of stock. Recorded in the log only.
pub async fn out_of_stock(
    config: &AppConfig,
    shop_id: &str,
    product_id: &str,
) -> Result<(), CliError> {
    let screen = open(config, shop_id, None).await?;
    screen.mark_out_of_stock(&ProductId::new(product_id));
    Ok(())
}
