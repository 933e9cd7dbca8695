//! Form validation for reviews, contact messages, bulk enquiries and orders.
//!
//! Each form trims its inputs and refuses to build a payload the server would
//! reject anyway, so the user sees the problem without a round trip.

use thiserror::Error;
use tiffin_core::{
    BulkRequest, ContactMessage, Email, EmailError, OrderSubmission, ProductId, Rating, Reply,
    ReviewSubmission,
};

use crate::api::ApiError;

/// Validation failures, worded for display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please provide a rating and feedback.")]
    IncompleteReview,

    #[error("Unknown dish: {0}")]
    InvalidFood(String),

    #[error("Missing fields")]
    MissingFields,

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Address is required")]
    MissingAddress,
}

/// Raw review form input.
#[derive(Debug, Clone, Default)]
pub struct ReviewForm {
    pub name: String,
    /// Selected star value, `None` when no star is checked.
    pub rating: Option<i64>,
    pub comment: String,
    /// Value of the dish select, empty for general feedback.
    pub food_id: Option<String>,
}

impl ReviewForm {
    /// # Errors
    ///
    /// [`FormError::IncompleteReview`] for a blank comment or a rating outside
    /// 1..=5, [`FormError::InvalidFood`] for a non-numeric dish id.
    pub fn validate(&self) -> Result<ReviewSubmission, FormError> {
        let comment = self.comment.trim();
        let rating = self
            .rating
            .and_then(|r| Rating::new(r).ok())
            .ok_or(FormError::IncompleteReview)?;
        if comment.is_empty() {
            return Err(FormError::IncompleteReview);
        }

        let food_id = match self.food_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<ProductId>()
                    .map_err(|_| FormError::InvalidFood(raw.to_string()))?,
            ),
        };

        Ok(ReviewSubmission {
            name: self.name.trim().to_string(),
            rating,
            comment: comment.to_string(),
            food_id,
        })
    }
}

/// Status line shown under the review form after a submission attempt.
#[must_use]
pub fn review_status(outcome: &Result<Reply, ApiError>) -> String {
    match outcome {
        Ok(reply) if reply.ok => "Feedback submitted!".to_string(),
        Ok(reply) => format!("Error: {}", reply.error.as_deref().unwrap_or("unknown error")),
        Err(_) => "Error sending feedback.".to_string(),
    }
}

/// Raw contact form input.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    /// # Errors
    ///
    /// [`FormError::MissingFields`] if any field is blank, or
    /// [`FormError::InvalidEmail`].
    pub fn validate(&self) -> Result<ContactMessage, FormError> {
        let (name, email, message) = required_triple(&self.name, &self.email, &self.message)?;
        Ok(ContactMessage {
            name,
            email,
            message,
        })
    }
}

/// Raw bulk-order enquiry input.
#[derive(Debug, Clone, Default)]
pub struct BulkForm {
    pub name: String,
    pub email: String,
    pub purpose: String,
}

impl BulkForm {
    /// # Errors
    ///
    /// [`FormError::MissingFields`] if any field is blank, or
    /// [`FormError::InvalidEmail`].
    pub fn validate(&self) -> Result<BulkRequest, FormError> {
        let (name, email, purpose) = required_triple(&self.name, &self.email, &self.purpose)?;
        Ok(BulkRequest {
            name,
            email,
            purpose,
        })
    }
}

/// Delivery address entered at checkout.
///
/// # Errors
///
/// [`FormError::MissingAddress`] for a blank address.
pub fn order_submission(address: &str) -> Result<OrderSubmission, FormError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(FormError::MissingAddress);
    }
    Ok(OrderSubmission {
        address: address.to_string(),
    })
}

fn required_triple(name: &str, email: &str, body: &str) -> Result<(String, Email, String), FormError> {
    let (name, email, body) = (name.trim(), email.trim(), body.trim());
    if name.is_empty() || email.is_empty() || body.is_empty() {
        return Err(FormError::MissingFields);
    }
    Ok((name.to_string(), Email::parse(email)?, body.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn review(rating: Option<i64>, comment: &str) -> ReviewForm {
        ReviewForm {
            name: "  Asha ".to_string(),
            rating,
            comment: comment.to_string(),
            food_id: None,
        }
    }

    #[test]
    fn test_review_trims_fields() {
        let submission = review(Some(4), "  Loved the pulao  ").validate().unwrap();
        assert_eq!(submission.name, "Asha");
        assert_eq!(submission.comment, "Loved the pulao");
        assert_eq!(submission.rating.stars(), 4);
        assert!(submission.food_id.is_none());
    }

    #[test]
    fn test_review_requires_rating_and_comment() {
        assert_eq!(review(None, "tasty").validate(), Err(FormError::IncompleteReview));
        assert_eq!(review(Some(0), "tasty").validate(), Err(FormError::IncompleteReview));
        assert_eq!(review(Some(6), "tasty").validate(), Err(FormError::IncompleteReview));
        assert_eq!(review(Some(3), "   ").validate(), Err(FormError::IncompleteReview));
    }

    #[test]
    fn test_review_food_id() {
        let mut form = review(Some(5), "ok");
        form.food_id = Some("3".to_string());
        assert_eq!(form.validate().unwrap().food_id, Some(ProductId::new(3)));

        form.food_id = Some(String::new());
        assert_eq!(form.validate().unwrap().food_id, None);

        form.food_id = Some("biryani".to_string());
        assert_eq!(
            form.validate(),
            Err(FormError::InvalidFood("biryani".to_string()))
        );
    }

    #[test]
    fn test_review_status_messages() {
        assert_eq!(review_status(&Ok(Reply::ok())), "Feedback submitted!");
        assert_eq!(
            review_status(&Ok(Reply::rejected("Invalid review data"))),
            "Error: Invalid review data"
        );
    }

    #[test]
    fn test_contact_requires_every_field() {
        let form = ContactForm {
            name: "Ravi".to_string(),
            email: " ".to_string(),
            message: "Hi".to_string(),
        };
        assert_eq!(form.validate(), Err(FormError::MissingFields));
    }

    #[test]
    fn test_contact_validates_email() {
        let form = ContactForm {
            name: "Ravi".to_string(),
            email: "ravi".to_string(),
            message: "Hi".to_string(),
        };
        assert_eq!(
            form.validate(),
            Err(FormError::InvalidEmail(EmailError::MissingAtSymbol))
        );
    }

    #[test]
    fn test_bulk_form() {
        let form = BulkForm {
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            purpose: " Wedding for 200 ".to_string(),
        };
        let request = form.validate().unwrap();
        assert_eq!(request.purpose, "Wedding for 200");
        assert_eq!(request.email.as_str(), "ravi@example.com");
    }

    #[test]
    fn test_order_submission() {
        assert_eq!(order_submission("  "), Err(FormError::MissingAddress));
        assert_eq!(
            order_submission(" 12 MG Road ").unwrap().address,
            "12 MG Road"
        );
    }
}
