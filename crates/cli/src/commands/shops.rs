//! Shop listing.
//!
//! # Usage
//!
//! ```bash
//! stockspot shops
//! stockspot shops --day 0 --geojson
//! ```

use std::sync::Arc;

use stockspot_app::config::AppConfig;
use stockspot_app::screens::ShopLocator;
use stockspot_app::supabase::SupabaseClient;
use stockspot_core::DayOfWeek;

use super::{CliError, Headless};

/// Print every shop with its hours for `day` (default: today).
pub async fn list(config: &AppConfig, day: Option<i64>, geojson: bool) -> Result<(), CliError> {
    let day = day
        .map(DayOfWeek::new)
        .transpose()?
        .unwrap_or_else(DayOfWeek::today);

    let client = SupabaseClient::new(&config.supabase)?;
    let mut locator = ShopLocator::new(Arc::new(client), Arc::new(Headless), Arc::new(Headless))
        .with_camera_settings(config.camera);
    locator.fetch_shops().await?;

    let cards = locator.cards(day);
    tracing::info!("{} shops", cards.len());
    for card in &cards {
        tracing::info!("  [{}] {} - {}", card.shop_id, card.name, card.hours);
    }

    if geojson {
        tracing::info!("{}", serde_json::to_string_pretty(&locator.features())?);
    }

    Ok(())
}
