//! Stockspot application library.
//!
//! Remote store client, ports for device and UI collaborators, and the two
//! screen models: the shop locator and the per-shop inventory manager.
//!
//! # Wiring
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use stockspot_app::config::AppConfig;
//! use stockspot_app::images::ImageUrls;
//! use stockspot_app::navigation::InventoryParams;
//! use stockspot_app::screens::InventoryManager;
//! use stockspot_app::supabase::SupabaseClient;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env()?;
//! let client = SupabaseClient::new(&config.supabase)?;
//! let params = InventoryParams {
//!     shop_id: Some("42".into()),
//!     name: Some("Corner Shop".to_string()),
//! };
//! let mut screen = InventoryManager::new(
//!     Arc::new(client),
//!     ImageUrls::from(&config.supabase),
//!     params,
//! )
//! .with_policy(config.compensation);
//! screen.load().await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod images;
pub mod navigation;
pub mod ports;
pub mod screens;
pub mod supabase;
pub mod telemetry;

pub use error::{AppError, Result};
