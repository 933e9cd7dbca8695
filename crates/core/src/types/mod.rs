//! Core types for Tiffin.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod product;
pub mod rating;
pub mod submission;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use product::{Category, CategoryFilter, Product};
pub use rating::{Rating, RatingError};
pub use submission::{BulkRequest, ContactMessage, OrderSubmission, Reply, Review, ReviewSubmission};
