//! Tiffin storefront client.
//!
//! Everything a food-ordering page needs besides the browser itself:
//!
//! - [`cart`]: the persisted cart reducer and its change subscribers
//! - [`search`]: fuzzy product ranking for the search box
//! - [`controller`]: explicit page state and delegated UI actions
//! - [`views`]: Askama HTML fragments rendered from that state
//! - [`api`]: the storefront HTTP API (catalog, reviews, forms, orders)
//! - [`forms`]: client-side validation of user-entered forms

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod controller;
pub mod error;
pub mod forms;
pub mod search;
pub mod storage;
pub mod views;

pub use api::{ApiClient, ApiError};
pub use cart::{Cart, CartChanged, CartStore};
pub use config::{ApiConfig, StorefrontConfig};
pub use controller::{SearchOutcome, Storefront, UiAction};
pub use error::{AppError, Result};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
