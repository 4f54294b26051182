//! Supabase REST client for shops, products and shop inventory.
//!
//! Talks to the project's `PostgREST` endpoint directly with `reqwest`. Every
//! call is a single statement: no transactions, no retries, no caching.
//!
//! # API Reference
//!
//! - Base URL: `{SUPABASE_URL}/rest/v1/{table}`
//! - Authentication: publishable key in both the `apikey` header and
//!   `Authorization: Bearer <key>`
//! - Writes send `Prefer: return=minimal`
//!
//! # Example
//!
//! ```rust,ignore
//! use stockspot_app::supabase::{Query, SupabaseClient, Table};
//!
//! let client = SupabaseClient::new(&config.supabase)?;
//! let rows: Vec<serde_json::Value> = client
//!     .select(&Query::new(Table::Products).select("*"))
//!     .await?;
//! ```

mod query;
mod stores;

pub use query::{Filter, Query, Table};

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::SupabaseConfig;
use crate::ports::StoreError;

/// Errors that can occur when talking to the Supabase REST API.
#[derive(Debug, Error)]
pub enum SupabaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Rate limited by the gateway.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Unauthorized (invalid or revoked key, or row-level security refusal).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Table or route not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse response or build a request.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SupabaseError {
    /// The backend's message, without the status prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. }
            | Self::Unauthorized(message)
            | Self::NotFound(message)
            | Self::Parse(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<SupabaseError> for StoreError {
    fn from(err: SupabaseError) -> Self {
        match err {
            SupabaseError::Http(e) => match e.status() {
                Some(status) => Self::rejected(status.as_u16(), e.to_string()),
                None if e.is_decode() => Self::decode(e.to_string()),
                None => Self::connection(e.to_string()),
            },
            SupabaseError::Api {
                status, message, ..
            } => Self::rejected(status, message),
            SupabaseError::RateLimited(_) => Self::rejected(429, err.to_string()),
            SupabaseError::Unauthorized(message) => Self::rejected(401, message),
            SupabaseError::NotFound(message) => Self::rejected(404, message),
            SupabaseError::Parse(message) => Self::decode(message),
        }
    }
}

/// `PostgREST` error body.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// Supabase REST client.
///
/// Cheap to clone; clones share one connection pool. Construct it once per
/// process and hand it to each screen.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl SupabaseClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        let key = config.publishable_key.expose_secret();
        let mut headers = HeaderMap::new();

        let mut api_key = HeaderValue::from_str(key)
            .map_err(|e| SupabaseError::Parse(format!("Invalid API key format: {e}")))?;
        api_key.set_sensitive(true);
        headers.insert("apikey", api_key);

        let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|e| SupabaseError::Parse(format!("Invalid API key format: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                client: builder.build()?,
                base_url: with_trailing_slash(config.url.clone()),
            }),
        })
    }

    /// Project base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// REST endpoint for `table`.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL cannot be joined (never for http(s) bases).
    pub fn table_url(&self, table: Table) -> Result<Url, SupabaseError> {
        self.inner
            .base_url
            .join(&format!("rest/v1/{table}"))
            .map_err(|e| SupabaseError::Parse(format!("Invalid table URL: {e}")))
    }

    /// Read rows matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or rows do not decode as `T`.
    pub async fn select<T: DeserializeOwned>(
        &self,
        query: &Query,
    ) -> Result<Vec<T>, SupabaseError> {
        let url = self.table_url(query.table())?;
        let response = self
            .inner
            .client
            .get(url)
            .query(&query.pairs())
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Insert `rows` into `table`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    pub async fn insert<B: Serialize + Sync>(
        &self,
        table: Table,
        rows: &B,
    ) -> Result<(), SupabaseError> {
        let url = self.table_url(table)?;
        let response = self
            .inner
            .client
            .post(url)
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await?;
        self.handle_empty(response).await
    }

    /// Apply `patch` to rows matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    pub async fn update<B: Serialize + Sync>(
        &self,
        query: &Query,
        patch: &B,
    ) -> Result<(), SupabaseError> {
        let url = self.table_url(query.table())?;
        let response = self
            .inner
            .client
            .patch(url)
            .query(&query.pairs())
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await?;
        self.handle_empty(response).await
    }

    /// Delete rows matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    pub async fn delete(&self, query: &Query) -> Result<(), SupabaseError> {
        let url = self.table_url(query.table())?;
        let response = self
            .inner
            .client
            .delete(url)
            .query(&query.pairs())
            .header("Prefer", "return=minimal")
            .send()
            .await?;
        self.handle_empty(response).await
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, SupabaseError> {
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| SupabaseError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(self.parse_error(response).await)
    }

    /// Handle a write response whose body is ignored.
    async fn handle_empty(&self, response: reqwest::Response) -> Result<(), SupabaseError> {
        if response.status().is_success() {
            return Ok(());
        }

        Err(self.parse_error(response).await)
    }

    /// Parse error response from the REST API.
    async fn parse_error(&self, response: reqwest::Response) -> SupabaseError {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return SupabaseError::RateLimited(retry_after);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        api_error(status.as_u16(), &body)
    }
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Map a non-success status and body to an error.
fn api_error(status: u16, body: &str) -> SupabaseError {
    let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();

    let message = parsed
        .as_ref()
        .and_then(|b| b.message.clone())
        .filter(|m| !m.is_empty())
        .map_or_else(
            || {
                if body.trim().is_empty() {
                    format!("HTTP {status}")
                } else {
                    body.trim().to_string()
                }
            },
            |m| {
                let extra = parsed
                    .as_ref()
                    .and_then(|b| b.details.clone().or_else(|| b.hint.clone()));
                match extra {
                    Some(extra) if !extra.is_empty() => format!("{m} ({extra})"),
                    _ => m,
                }
            },
        );

    match status {
        401 | 403 => SupabaseError::Unauthorized(message),
        404 => SupabaseError::NotFound(message),
        _ => SupabaseError::Api {
            status,
            code: parsed.and_then(|b| b.code),
            message,
        },
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
