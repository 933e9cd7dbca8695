//! Unified error handling with Sentry integration.
//!
//! Cart and search operations never fail; everything that can (network
//! calls, form validation, configuration, rendering) reports through
//! [`AppError`].

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::forms::FormError;
use crate::storage::StorageError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storefront API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A form failed validation before submission.
    #[error("{0}")]
    Form(#[from] FormError),

    /// A view template failed to render.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// The server answered `{ ok: false }`.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// No product with this id in the catalog.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Checkout attempted with nothing in the cart.
    #[error("Your cart is empty!")]
    EmptyCart,
}

impl AppError {
    /// Whether the error is the user's to fix rather than a fault.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Form(_) | Self::Rejected(_) | Self::NotFound(_) | Self::EmptyCart
        )
    }

    /// Log the error and, for faults, capture it to Sentry.
    pub fn report(&self) {
        if self.is_user_error() {
            tracing::warn!(error = %self, "Request refused");
            return;
        }

        let event_id = sentry::capture_error(self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Request error"
        );
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
