//! Stockspot CLI - drive the locator and inventory screens from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List shops with today's opening hours
//! stockspot shops
//!
//! # Hours for Saturday, plus the map features as GeoJSON
//! stockspot shops --day 6 --geojson
//!
//! # Show a shop's inventory
//! stockspot inventory show 42 --name "Corner Shop"
//!
//! # Change a shop's inventory
//! stockspot inventory add 42 7
//! stockspot inventory in-stock 42 7
//! stockspot inventory remove 42 7
//! ```
//!
//! Configuration is read from the environment (and `.env`), see
//! `stockspot_app::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use stockspot_app::config::AppConfig;
use stockspot_app::telemetry;

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "stockspot")]
#[command(author, version, about = "Stockspot shop locator and inventory tools")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List shops with their opening hours
    Shops {
        /// Day of week, 0 = Sunday (default: today)
        #[arg(short, long)]
        day: Option<i64>,

        /// Also print the map features as GeoJSON
        #[arg(long)]
        geojson: bool,
    },
    /// Inspect or change a shop's inventory
    Inventory {
        #[command(subcommand)]
        action: InventoryAction,
    },
}

#[derive(Subcommand)]
enum InventoryAction {
    /// Show assigned and available products
    Show {
        /// Shop ID
        shop_id: String,

        /// Shop name for the title
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Assign a product to the shop
    Add { shop_id: String, product_id: String },
    /// Unassign a product from the shop
    Remove { shop_id: String, product_id: String },
    /// Mark a product as verified in stock now
    InStock { shop_id: String, product_id: String },
    /// Report a product as out of stock
    OutOfStock { shop_id: String, product_id: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    // Sentry before the subscriber so the tracing layer has a client
    let _sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing(cli.json_logs);

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &AppConfig) -> Result<(), CliError> {
    match cli.command {
        Commands::Shops { day, geojson } => commands::shops::list(config, day, geojson).await?,
        Commands::Inventory { action } => match action {
            InventoryAction::Show { shop_id, name } => {
                commands::inventory::show(config, &shop_id, name).await?;
            }
            InventoryAction::Add {
                shop_id,
                product_id,
            } => commands::inventory::add(config, &shop_id, &product_id).await?,
            InventoryAction::Remove {
                shop_id,
                product_id,
            } => commands::inventory::remove(config, &shop_id, &product_id).await?,
            InventoryAction::InStock {
                shop_id,
                product_id,
            } => commands::inventory::in_stock(config, &shop_id, &product_id).await?,
            InventoryAction::OutOfStock {
                shop_id,
                product_id,
            } => commands::inventory::out_of_stock(config, &shop_id, &product_id).await?,
        },
    }
    Ok(())
}
