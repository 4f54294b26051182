//! Application configuration loaded from environment variables.
//!
//! Every variable is optional. The defaults select the production backend
//! project and reproduce the camera behaviour of the shipped app.
//!
//! # Environment Variables
//!
//! - `SUPABASE_URL` - Project base URL (default: the production project)
//! - `SUPABASE_PUBLISHABLE_KEY` - Publishable (anon) API key (default: production key)
//! - `STOCKSPOT_IMAGE_BUCKET` - Public bucket for product images (default: `product_images`)
//! - `STOCKSPOT_HTTP_TIMEOUT_SECS` - Per-request timeout (default: none)
//! - `STOCKSPOT_SHOP_ZOOM` - Camera zoom when focusing a shop (default: 16)
//! - `STOCKSPOT_USER_ZOOM` - Camera zoom for "Center map" (default: 14)
//! - `STOCKSPOT_CAMERA_ANIMATION_MS` - Camera animation duration (default: 1000)
//! - `STOCKSPOT_COMPENSATION` - `source` or `uniform` rollback policy (default: `source`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::screens::{CameraSettings, CompensationPolicy};

/// Production project URL.
pub const DEFAULT_SUPABASE_URL: &str = "https://mljdghhebfkxyjmlotks.supabase.co";

/// Production publishable key. Publishable keys are meant to ship in clients;
/// row-level security on the backend decides what they can touch.
pub const DEFAULT_PUBLISHABLE_KEY: &str = "sb_publishable_sh5-EQAgAQ3jjltXu6EizA_S1m6QGln";

/// Bucket holding product images.
pub const DEFAULT_IMAGE_BUCKET: &str = "product_images";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Remote store connection settings.
    pub supabase: SupabaseConfig,
    /// Locator camera behaviour.
    pub camera: CameraSettings,
    /// Rollback policy for inventory mutations.
    pub compensation: CompensationPolicy,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
    /// Sentry environment name.
    pub sentry_environment: Option<String>,
}

/// Remote store connection settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project base URL, e.g. `https://<ref>.supabase.co`.
    pub url: Url,
    /// Publishable API key.
    pub publishable_key: SecretString,
    /// Public storage bucket for product images.
    pub image_bucket: String,
    /// Optional per-request timeout.
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_str())
            .field("publishable_key", &"[REDACTED]")
            .field("image_bucket", &self.image_bucket)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SupabaseConfig {
    /// Settings for a project URL and key, with the default bucket.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `url` is not an absolute
    /// http(s) URL.
    pub fn new(url: &str, publishable_key: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            url: parse_base_url("SUPABASE_URL", url)?,
            publishable_key: SecretString::from(publishable_key.into()),
            image_bucket: DEFAULT_IMAGE_BUCKET.to_string(),
            timeout: None,
        })
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = lookup("SUPABASE_URL").unwrap_or_else(|| DEFAULT_SUPABASE_URL.to_string());
        let key = lookup("SUPABASE_PUBLISHABLE_KEY")
            .unwrap_or_else(|| DEFAULT_PUBLISHABLE_KEY.to_string());
        if key.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar(
                "SUPABASE_PUBLISHABLE_KEY".to_string(),
            ));
        }

        let timeout = lookup("STOCKSPOT_HTTP_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "STOCKSPOT_HTTP_TIMEOUT_SECS".to_string(),
                        e.to_string(),
                    )
                })
            })
            .transpose()?;

        Ok(Self {
            url: parse_base_url("SUPABASE_URL", &url)?,
            publishable_key: SecretString::from(key),
            image_bucket: lookup("STOCKSPOT_IMAGE_BUCKET")
                .unwrap_or_else(|| DEFAULT_IMAGE_BUCKET.to_string()),
            timeout,
        })
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let supabase = SupabaseConfig::from_lookup(lookup)?;

        let defaults = CameraSettings::default();
        let camera = CameraSettings {
            shop_zoom: parse_or(lookup, "STOCKSPOT_SHOP_ZOOM", defaults.shop_zoom)?,
            user_zoom: parse_or(lookup, "STOCKSPOT_USER_ZOOM", defaults.user_zoom)?,
            animation: lookup("STOCKSPOT_CAMERA_ANIMATION_MS")
                .map(|raw| {
                    raw.parse::<u64>().map(Duration::from_millis).map_err(|e| {
                        ConfigError::InvalidEnvVar(
                            "STOCKSPOT_CAMERA_ANIMATION_MS".to_string(),
                            e.to_string(),
                        )
                    })
                })
                .transpose()?
                .unwrap_or(defaults.animation),
        };

        let compensation = parse_or(
            lookup,
            "STOCKSPOT_COMPENSATION",
            CompensationPolicy::default(),
        )?;

        Ok(Self {
            supabase,
            camera,
            compensation,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a base URL, rejecting anything but absolute http(s) URLs.
fn parse_base_url(var_name: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }

    Ok(url)
}

/// Parse an optional numeric variable with a default.
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(&lookup_from(&[])).unwrap();
        assert_eq!(
            config.supabase.url.as_str(),
            "https://mljdghhebfkxyjmlotks.supabase.co/",
        );
        assert_eq!(
            config.supabase.publishable_key.expose_secret(),
            DEFAULT_PUBLISHABLE_KEY
        );
        assert_eq!(config.supabase.image_bucket, "product_images");
        assert!(config.supabase.timeout.is_none());
        assert!((config.camera.shop_zoom - 16.0).abs() < f64::EPSILON);
        assert!((config.camera.user_zoom - 14.0).abs() < f64::EPSILON);
        assert_eq!(config.camera.animation, Duration::from_millis(1000));
        assert_eq!(config.compensation, CompensationPolicy::Source);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(&lookup_from(&[
            ("SUPABASE_URL", "http://localhost:54321"),
            ("SUPABASE_PUBLISHABLE_KEY", "local-key"),
            ("STOCKSPOT_IMAGE_BUCKET", "thumbs"),
            ("STOCKSPOT_HTTP_TIMEOUT_SECS", "15"),
            ("STOCKSPOT_SHOP_ZOOM", "20"),
            ("STOCKSPOT_CAMERA_ANIMATION_MS", "250"),
            ("STOCKSPOT_COMPENSATION", "uniform"),
            ("SENTRY_DSN", ""),
        ]))
        .unwrap();

        assert_eq!(config.supabase.url.as_str(), "http://localhost:54321/");
        assert_eq!(config.supabase.image_bucket, "thumbs");
        assert_eq!(config.supabase.timeout, Some(Duration::from_secs(15)));
        assert!((config.camera.shop_zoom - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.camera.animation, Duration::from_millis(250));
        assert_eq!(config.compensation, CompensationPolicy::Uniform);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_url() {
        let err = AppConfig::from_lookup(&lookup_from(&[("SUPABASE_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref var, _) if var == "SUPABASE_URL"));

        let err = AppConfig::from_lookup(&lookup_from(&[("SUPABASE_URL", "ftp://host")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_invalid_zoom() {
        let err = AppConfig::from_lookup(&lookup_from(&[("STOCKSPOT_USER_ZOOM", "close")]))
            .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref var, _) if var == "STOCKSPOT_USER_ZOOM")
        );
    }

    #[test]
    fn test_invalid_compensation() {
        let err = AppConfig::from_lookup(&lookup_from(&[("STOCKSPOT_COMPENSATION", "always")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_blank_key_is_missing() {
        let err = AppConfig::from_lookup(&lookup_from(&[("SUPABASE_PUBLISHABLE_KEY", "  ")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_supabase_config_debug_redacts_key() {
        let config =
            SupabaseConfig::new("https://example.supabase.co", "sb_publishable_abc").unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sb_publishable_abc"));
    }
}
