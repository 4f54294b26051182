//! Unified error handling for screen operations.

use thiserror::Error;

use crate::config::ConfigError;
use crate::ports::{GeolocationError, StoreError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("Location error: {0}")]
    Geolocation(#[from] GeolocationError),

    #[error("No shop selected")]
    NoShopSelected,

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Log the error and forward store failures to Sentry.
    ///
    /// The tracing layer turns the `error!` event into a Sentry event; the
    /// `operation` tag is scoped to that event only.
    pub fn report(&self, operation: &'static str) {
        match self {
            Self::Store(err) => {
                sentry::with_scope(
                    |scope| scope.set_tag("operation", operation),
                    || tracing::error!(error = %err, operation, "Store request failed"),
                );
            }
            Self::Geolocation(err) => {
                tracing::warn!(error = %err, operation, "Location unavailable");
            }
            Self::Config(_) | Self::NoShopSelected | Self::NotFound(_) => {
                tracing::warn!(error = %self, operation, "Operation rejected");
            }
        }
    }

    /// The message a screen shows for this error.
    ///
    /// Falls back to `fallback` when the underlying message is empty.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

/// Result alias for screen operations.
pub type Result<T> = std::result::Result<T, AppError>;
