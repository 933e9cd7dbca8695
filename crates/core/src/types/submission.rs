//! Form payloads sent to the storefront API and the replies it returns.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Email, ProductId, Rating, ReviewId};

/// Body of `POST /api/submit_review`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSubmission {
    /// Reviewer name; the server substitutes "Anonymous" when empty.
    pub name: String,
    pub rating: Rating,
    pub comment: String,
    /// The dish being reviewed, or `None` for general feedback.
    pub food_id: Option<ProductId>,
}

/// A stored review, as listed by `GET /api/reviews`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    #[serde(default)]
    pub food_id: Option<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
    pub rating: Rating,
    pub comment: String,
    pub created_at: NaiveDateTime,
}

impl Review {
    /// Name to show next to the review.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "Anonymous",
        }
    }
}

/// Body of `POST /api/contact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: Email,
    pub message: String,
}

/// Body of `POST /api/bulk`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkRequest {
    pub name: String,
    pub email: Email,
    pub purpose: String,
}

/// Body of `POST /submit_order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSubmission {
    pub address: String,
}

/// The `{ ok, error? }` envelope every form endpoint answers with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reply {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Reply {
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    #[must_use]
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_review_submission_wire_format() {
        let submission = ReviewSubmission {
            name: String::new(),
            rating: Rating::new(5).unwrap(),
            comment: "Great biryani".to_string(),
            food_id: Some(ProductId::new(1)),
        };
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "",
                "rating": 5,
                "comment": "Great biryani",
                "food_id": 1
            })
        );
    }

    #[test]
    fn test_review_from_listing() {
        let review: Review = serde_json::from_str(
            r#"{
                "id": 4,
                "food_id": null,
                "name": "",
                "rating": 4,
                "comment": "Nice",
                "created_at": "2025-03-01T12:30:45.123456"
            }"#,
        )
        .unwrap();
        assert_eq!(review.id, ReviewId::new(4));
        assert_eq!(review.display_name(), "Anonymous");
        assert_eq!(review.rating.stars(), 4);
    }

    #[test]
    fn test_reply_error_optional() {
        let reply: Reply = serde_json::from_str(r#"{"ok": true}"#).unwrap();
        assert_eq!(reply, Reply::ok());

        let reply: Reply =
            serde_json::from_str(r#"{"ok": false, "error": "Missing fields"}"#).unwrap();
        assert_eq!(reply, Reply::rejected("Missing fields"));
    }
}
