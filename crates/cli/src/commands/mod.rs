//! Subcommand implementations.

pub mod inventory;
pub mod shops;

use stockspot_app::AppError;
use stockspot_app::navigation::Route;
use stockspot_app::ports::{CameraUpdate, MapCamera, Navigator};
use stockspot_app::supabase::SupabaseError;
use stockspot_core::HoursError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The client could not be built.
    #[error("Client error: {0}")]
    Client(#[from] SupabaseError),

    /// A screen operation failed.
    #[error("{0}")]
    App(#[from] AppError),

    /// `--day` was out of range.
    #[error("Invalid day: {0}")]
    InvalidDay(#[from] HoursError),

    /// JSON output failed.
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Stand-in for the map and navigation stack when running headless.
///
/// Camera moves and navigation are logged at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct Headless;

impl MapCamera for Headless {
    fn set_camera(&self, update: CameraUpdate) {
        tracing::debug!(
            center = %update.center,
            zoom = update.zoom,
            animation_ms = update.animation.as_millis(),
            "Camera move"
        );
    }
}

impl Navigator for Headless {
    fn navigate(&self, route: Route) {
        tracing::debug!(path = route.path(), "Navigate");
    }
}
