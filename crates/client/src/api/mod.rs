//! Client for the store's REST API.
//!
//! # Architecture
//!
//! - The API is the source of truth for products, orders and stats; nothing
//!   is synced locally except the cart.
//! - Every response is wrapped in an [`Envelope`] (`{success, data, error}`).
//! - Catalog responses are cached in memory via `moka`.
//! - Read-only views have `*_or_sample` variants that fall back to built-in
//!   sample data when the API is unreachable, reporting a [`DataSource`].
//!
//! # Example
//!
//! ```rust,ignore
//! use order_desk_client::{ApiClient, ClientConfig};
//!
//! let client = ApiClient::new(&ClientConfig::from_env()?)?;
//!
//! let grouped = client.products_by_category().await?;
//! let cities = client.cities_or_sample().await;
//! ```

mod cache;
mod client;

pub use client::ApiClient;

use serde::Deserialize;
use thiserror::Error;

use order_desk_core::OrderId;

/// Errors that can occur when talking to the store API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status code.
    #[error("HTTP {0}: {1}")]
    Status(u16, String),

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The API reported `success: false`.
    #[error("API error: {0}")]
    Api(String),

    /// The API reported success but sent no data.
    #[error("API response has no data")]
    MissingData,

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// The wrapper around every API response.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    /// Number of records, on list endpoints.
    pub count: Option<u64>,
    /// New order ID, on order creation.
    pub order_id: Option<OrderId>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload of a successful response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api` when `success` is false and
    /// `ApiError::MissingData` when there is no payload.
    pub fn into_data(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Api(
                self.error.unwrap_or_else(|| "Request failed".to_string()),
            ));
        }
        self.data.ok_or(ApiError::MissingData)
    }
}

/// Where the data in a [`Fetched`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Returned by the API.
    Live,
    /// Built-in sample data, because the API call failed.
    Sample,
}

/// Data from a view that may have fallen back to sample data.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub source: DataSource,
}

impl<T> Fetched<T> {
    pub(crate) const fn live(data: T) -> Self {
        Self {
            data,
            source: DataSource::Live,
        }
    }

    pub(crate) const fn sample(data: T) -> Self {
        Self {
            data,
            source: DataSource::Sample,
        }
    }

    /// Whether this is sample data.
    #[must_use]
    pub fn is_sample(&self) -> bool {
        self.source == DataSource::Sample
    }
}
