//! Command implementations.
//!
//! Every command writes its output to [`Context::out`] so it can be captured
//! in tests; logs go through `tracing`.

pub mod cart;
pub mod forms;
pub mod menu;
pub mod render;

use thiserror::Error;
use tiffin_core::ProductId;
use tiffin_storefront::forms::FormError;
use tiffin_storefront::{ApiClient, ApiError, AppError, KeyValueStore, Storefront};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    App(#[from] AppError),

    /// Writing command output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ApiError> for CliError {
    fn from(e: ApiError) -> Self {
        Self::App(e.into())
    }
}

impl From<FormError> for CliError {
    fn from(e: FormError) -> Self {
        Self::App(e.into())
    }
}

impl From<askama::Error> for CliError {
    fn from(e: askama::Error) -> Self {
        Self::App(e.into())
    }
}

impl CliError {
    /// Log the error; faults are also captured to Sentry.
    pub fn report(&self) {
        match self {
            Self::App(e) => e.report(),
            Self::Io(e) => tracing::error!(error = %e, "Failed to write output"),
        }
    }
}

/// Everything a command needs.
pub struct Context<W, S> {
    /// Prefix joined with product image filenames
    pub image_base: String,
    pub api: ApiClient,
    pub shop: Storefront<S>,
    pub out: W,
}

impl<W, S: KeyValueStore> Context<W, S> {
    /// Fetch the catalog (served from cache when fresh) into the page state.
    pub async fn load_catalog(&mut self) -> Result<(), CliError> {
        let products = self.api.fetch_catalog().await?;
        self.shop.set_catalog(products);
        Ok(())
    }
}

/// Normalize a user-typed product id to its cart key.
///
/// # Errors
///
/// Returns `AppError::NotFound` if `raw` is not a numeric id.
pub fn cart_key(raw: &str) -> Result<String, CliError> {
    raw.parse::<ProductId>()
        .map(|id| id.cart_key())
        .map_err(|_| AppError::NotFound(format!("product {}", raw.trim())).into())
}
