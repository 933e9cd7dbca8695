//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `TIFFIN_API_BASE_URL` - Storefront API origin (default: `http://127.0.0.1:5000/`)
//! - `TIFFIN_STORAGE_PATH` - Local key-value store file (default: `.tiffin/storage.json`)
//! - `TIFFIN_IMAGE_BASE` - Prefix for product image URLs (default: `/static/images/`)
//! - `TIFFIN_CATALOG_TTL_SECS` - Catalog cache lifetime in seconds (default: 300)
//! - `TIFFIN_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000/";
const DEFAULT_STORAGE_PATH: &str = ".tiffin/storage.json";
const DEFAULT_IMAGE_BASE: &str = "/static/images/";
const DEFAULT_CATALOG_TTL_SECS: u64 = 300;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Storefront API settings
    pub api: ApiConfig,
    /// File backing the local key-value store
    pub storage_path: PathBuf,
    /// Prefix joined with each product's image filename
    pub image_base: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Storefront API client settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API origin; always ends with `/` so endpoint paths join onto it
    pub base_url: Url,
    /// How long a fetched catalog is served from cache
    pub catalog_ttl: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Settings for `base_url` with default TTL and timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("TIFFIN_API_BASE_URL", base_url)?,
            catalog_ttl: Duration::from_secs(DEFAULT_CATALOG_TTL_SECS),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let base_url = parse_base_url(
            "TIFFIN_API_BASE_URL",
            &get_or("TIFFIN_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;
        let catalog_ttl = parse_secs(
            "TIFFIN_CATALOG_TTL_SECS",
            lookup("TIFFIN_CATALOG_TTL_SECS"),
            DEFAULT_CATALOG_TTL_SECS,
        )?;
        let timeout = parse_secs(
            "TIFFIN_HTTP_TIMEOUT_SECS",
            lookup("TIFFIN_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;

        Ok(Self {
            api: ApiConfig {
                base_url,
                catalog_ttl,
                timeout,
            },
            storage_path: PathBuf::from(get_or("TIFFIN_STORAGE_PATH", DEFAULT_STORAGE_PATH)),
            image_base: get_or("TIFFIN_IMAGE_BASE", DEFAULT_IMAGE_BASE),
            sentry_dsn: lookup("SENTRY_DSN").filter(|v| !v.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT").filter(|v| !v.is_empty()),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse an http(s) origin, forcing a trailing slash on the path.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar(key.to_string(), reason);

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_secs(key: &str, raw: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    let secs = match raw {
        Some(v) => v
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?,
        None => default,
    };
    Ok(Duration::from_secs(secs))
}
