//! HTTP implementation of the store API client.
//!
//! Uses `reqwest` for HTTP and caches catalog data using `moka`.

use std::sync::Arc;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};
use url::Url;

use order_desk_core::catalog::{Product, ProductsByCategory, find_in_groups};
use order_desk_core::checkout::OrderRequest;
use order_desk_core::orders::{Order, OrderQuery};
use order_desk_core::samples::{sample_cities, sample_orders, sample_stats};
use order_desk_core::stats::Stats;
use order_desk_core::{ConnectionStatus, OrderId};

use super::cache::{self, CacheValue};
use super::{ApiError, Envelope, Fetched};
use crate::config::ClientConfig;

/// Longest response body excerpt written to the logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the store REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(100)
            .time_to_live(config.cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
                api_token: config.api_token.clone(),
                cache,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop all cached catalog data.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Transport
    // =========================================================================

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Send a request and return the body of a 2xx response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let request = match &self.inner.api_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %truncate(&body, LOG_BODY_LIMIT),
                "Store API returned non-success status"
            );
            // Error responses usually still carry an envelope with a message
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.error)
                .unwrap_or_else(|| truncate(&body, 200));
            return Err(ApiError::Status(status.as_u16(), message));
        }

        Ok(body)
    }

    fn decode<T: DeserializeOwned>(body: &str) -> Result<Envelope<T>, ApiError> {
        serde_json::from_str(body).map_err(|e| {
            error!(
                error = %e,
                body = %truncate(body, LOG_BODY_LIMIT),
                "Failed to parse store API response"
            );
            ApiError::Parse(e)
        })
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path, query)?;
        debug!(url = %url, "GET");
        let body = self.send(self.inner.client.get(url)).await?;
        Self::decode::<T>(&body)?.into_data()
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch all products.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(cache::PRODUCTS).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_data("api/products", &[]).await?;
        self.inner
            .cache
            .insert(cache::PRODUCTS.to_string(), CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Fetch products bucketed by category.
    #[instrument(skip(self))]
    pub async fn products_by_category(&self) -> Result<ProductsByCategory, ApiError> {
        if let Some(CacheValue::ProductsByCategory(groups)) =
            self.inner.cache.get(cache::PRODUCTS_BY_CATEGORY).await
        {
            debug!("Cache hit for grouped products");
            return Ok(groups);
        }

        let groups: ProductsByCategory = self
            .get_data("api/products/grouped-by-category", &[])
            .await?;
        self.inner
            .cache
            .insert(
                cache::PRODUCTS_BY_CATEGORY.to_string(),
                CacheValue::ProductsByCategory(groups.clone()),
            )
            .await;
        Ok(groups)
    }

    /// Find a product by ID, with the category it is listed under.
    ///
    /// Products without an explicit `Category` take the name of the group
    /// they were found in.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if no product has this ID.
    #[instrument(skip(self))]
    pub async fn product(&self, product_id: &str) -> Result<Product, ApiError> {
        let groups = self.products_by_category().await?;
        let (category, product) = find_in_groups(&groups, product_id)
            .ok_or_else(|| ApiError::NotFound(format!("product {product_id}")))?;

        let mut product = product.clone();
        if product.category.is_none() {
            product.category = Some(category.to_owned());
        }
        Ok(product)
    }

    /// Fetch category names.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, ApiError> {
        self.cached_names(cache::CATEGORIES, "api/categories").await
    }

    /// Fetch the cities the store delivers to.
    #[instrument(skip(self))]
    pub async fn cities(&self) -> Result<Vec<String>, ApiError> {
        self.cached_names(cache::CITIES, "api/cities").await
    }

    /// Cities, or the built-in sample list if the API call fails.
    pub async fn cities_or_sample(&self) -> Fetched<Vec<String>> {
        match self.cities().await {
            Ok(cities) => Fetched::live(cities),
            Err(e) => {
                warn!(error = %e, "Failed to load cities, using sample cities");
                Fetched::sample(sample_cities())
            }
        }
    }

    /// Fetch known areas of a city.
    #[instrument(skip(self))]
    pub async fn areas(&self, city: &str) -> Result<Vec<String>, ApiError> {
        let path = format!("api/areas/{}", urlencoding::encode(city));
        self.get_data(&path, &[]).await
    }

    /// Areas of a city, or an empty list if the API call fails. Areas are
    /// only suggestions, so there is no sample fallback.
    pub async fn areas_or_empty(&self, city: &str) -> Vec<String> {
        self.areas(city).await.unwrap_or_else(|e| {
            warn!(city, error = %e, "Failed to load areas");
            Vec::new()
        })
    }

    async fn cached_names(&self, key: &str, path: &str) -> Result<Vec<String>, ApiError> {
        if let Some(CacheValue::Names(names)) = self.inner.cache.get(key).await {
            debug!(key, "Cache hit");
            return Ok(names);
        }

        let names: Vec<String> = self.get_data(path, &[]).await?;
        self.inner
            .cache
            .insert(key.to_string(), CacheValue::Names(names.clone()))
            .await;
        Ok(names)
    }

    // =========================================================================
    // Orders & stats
    // =========================================================================

    /// Fetch orders matching the server-side filters.
    #[instrument(skip(self))]
    pub async fn orders(&self, query: &OrderQuery) -> Result<Vec<Order>, ApiError> {
        self.get_data("api/orders", &query.to_pairs()).await
    }

    /// Orders, or the built-in sample orders if the API call fails.
    pub async fn orders_or_sample(&self, query: &OrderQuery) -> Fetched<Vec<Order>> {
        match self.orders(query).await {
            Ok(orders) => Fetched::live(orders),
            Err(e) => {
                warn!(error = %e, "Failed to load orders, using sample orders");
                Fetched::sample(sample_orders())
            }
        }
    }

    /// Create an order. Returns the ID assigned by the API, if it sent one.
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn create_order(&self, order: &OrderRequest) -> Result<Option<OrderId>, ApiError> {
        let url = self.endpoint("api/orders", &[])?;
        let body = self
            .send(self.inner.client.post(url).json(order))
            .await?;

        let envelope = Self::decode::<serde_json::Value>(&body)?;
        if !envelope.success {
            return Err(ApiError::Api(
                envelope
                    .error
                    .unwrap_or_else(|| "Failed to create order".to_string()),
            ));
        }

        // Older deployments nest the ID under `data`
        let order_id = envelope.order_id.or_else(|| {
            envelope
                .data
                .as_ref()
                .and_then(|data| data.get("order_id"))
                .and_then(|id| serde_json::from_value::<OrderId>(id.clone()).ok())
        });
        if order_id.is_none() {
            warn!("Order created but the API returned no order ID");
        }
        Ok(order_id)
    }

    /// Fetch dashboard statistics.
    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<Stats, ApiError> {
        self.get_data("api/stats", &[]).await
    }

    /// Stats, or the built-in sample stats if the API call fails.
    pub async fn stats_or_sample(&self) -> Fetched<Stats> {
        match self.stats().await {
            Ok(stats) => Fetched::live(stats),
            Err(e) => {
                warn!(error = %e, "Failed to load stats, using sample stats");
                Fetched::sample(sample_stats())
            }
        }
    }

    /// Check API reachability. Never fails; transport errors map to
    /// `ConnectionStatus::Offline`.
    #[instrument(skip(self))]
    pub async fn health(&self) -> ConnectionStatus {
        let url = match self.endpoint("api/health", &[]) {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Invalid health URL");
                return ConnectionStatus::Offline;
            }
        };

        let body = match self.send(self.inner.client.get(url)).await {
            Ok(body) => body,
            Err(ApiError::Status(status, _)) => {
                debug!(status, "Health check answered with error status");
                return ConnectionStatus::Disconnected;
            }
            Err(e) => {
                warn!(error = %e, "Health check failed");
                return ConnectionStatus::Offline;
            }
        };

        let healthy = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| value.get("status").and_then(|s| s.as_str().map(str::to_owned)))
            .is_some_and(|status| status == "healthy");

        if healthy {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        }
    }
}

/// Truncate to at most `limit` characters.
fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
