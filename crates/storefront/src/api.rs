//! Storefront HTTP API client.
//!
//! Wraps the JSON endpoints the storefront server exposes:
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | GET | `/api/foods` | Product catalog |
//! | GET | `/api/reviews[?food_id=N]` | Reviews, newest first |
//! | POST | `/api/submit_review` | Leave a review |
//! | POST | `/api/contact` | Contact message |
//! | POST | `/api/bulk` | Bulk-order enquiry |
//! | POST | `/submit_order` | Place the order with a delivery address |
//!
//! The catalog is cached in memory via `moka` (TTL from [`ApiConfig`]).
//! Form endpoints answer `{ ok, error? }`; a 400 carrying that envelope is a
//! [`Reply`] with `ok == false`, not an [`ApiError`].

use std::sync::Arc;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tiffin_core::{
    BulkRequest, ContactMessage, OrderSubmission, Product, ProductId, Reply, Review,
    ReviewSubmission,
};
use tracing::{debug, instrument};
use url::Url;

use crate::config::ApiConfig;

/// Longest slice of a response body kept in errors and logs.
const BODY_EXCERPT_CHARS: usize = 200;

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint path could not be joined onto the base URL.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// Server answered with a non-success status and no reply envelope.
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Rate limited by the server.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

/// Cache key for API responses.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum CacheKey {
    Catalog,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront JSON API.
///
/// Cheap to clone; clones share the HTTP connection pool and catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, Arc<Vec<Product>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(config.catalog_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// The API origin requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the product catalog, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn fetch_catalog(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(products) = self.inner.cache.get(&CacheKey::Catalog).await {
            debug!("Cache hit for catalog");
            return Ok(products.as_ref().clone());
        }

        let url = self.endpoint("api/foods")?;
        let products: Vec<Product> = self.get_json(url).await?;
        debug!(count = products.len(), "Fetched catalog");

        self.inner
            .cache
            .insert(CacheKey::Catalog, Arc::new(products.clone()))
            .await;

        Ok(products)
    }

    /// Drop the cached catalog so the next fetch hits the server.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate(&CacheKey::Catalog).await;
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// List reviews, newest first, optionally for one dish.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a review list.
    #[instrument(skip(self))]
    pub async fn fetch_reviews(&self, food_id: Option<ProductId>) -> Result<Vec<Review>, ApiError> {
        let mut url = self.endpoint("api/reviews")?;
        if let Some(id) = food_id {
            url.query_pairs_mut()
                .append_pair("food_id", &id.to_string());
        }
        self.get_json(url).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the server does not answer
    /// with a reply envelope.
    #[instrument(skip_all, fields(rating = submission.rating.stars(), food_id = ?submission.food_id))]
    pub async fn submit_review(&self, submission: &ReviewSubmission) -> Result<Reply, ApiError> {
        self.post_form("api/submit_review", submission).await
    }

    // =========================================================================
    // Other forms
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails or the server does not answer
    /// with a reply envelope.
    #[instrument(skip_all)]
    pub async fn submit_contact(&self, message: &ContactMessage) -> Result<Reply, ApiError> {
        self.post_form("api/contact", message).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the server does not answer
    /// with a reply envelope.
    #[instrument(skip_all)]
    pub async fn submit_bulk_request(&self, request: &BulkRequest) -> Result<Reply, ApiError> {
        self.post_form("api/bulk", request).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the server does not answer
    /// with a reply envelope.
    #[instrument(skip_all)]
    pub async fn submit_order(&self, order: &OrderSubmission) -> Result<Reply, ApiError> {
        self.post_form("submit_order", order).await
    }

    // =========================================================================
    // Transport
    // =========================================================================

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.inner.client.get(url).send().await?;
        let (status, body) = read_body(response).await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %excerpt(&body),
                "Storefront API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, body = %excerpt(&body), "Failed to parse API response");
            ApiError::Parse(e)
        })
    }

    async fn post_form<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Reply, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.inner.client.post(url).json(body).send().await?;
        let (status, text) = read_body(response).await?;

        match serde_json::from_str::<Reply>(&text) {
            Ok(reply) => {
                if !reply.ok {
                    debug!(status = %status, error = ?reply.error, "Form rejected");
                }
                Ok(reply)
            }
            Err(_) if !status.is_success() => Err(ApiError::Status {
                status: status.as_u16(),
                body: excerpt(&text),
            }),
            Err(e) => Err(ApiError::Parse(e)),
        }
    }
}

/// Split a response into status and body, surfacing 429 as `RateLimited`.
async fn read_body(response: reqwest::Response) -> Result<(reqwest::StatusCode, String), ApiError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(ApiError::RateLimited(retry_after));
    }

    let body = response.text().await?;
    Ok((status, body))
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
