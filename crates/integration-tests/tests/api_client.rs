//! Storefront API client against the in-process fake server.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;
use tiffin_core::{
    BulkRequest, ContactMessage, Email, OrderSubmission, Price, ProductId, Rating,
    ReviewSubmission,
};
use tiffin_integration_tests::{FakeApi, sample_catalog};
use tiffin_storefront::ApiError;
use tiffin_storefront::forms::{ReviewForm, review_status};

#[tokio::test]
async fn test_fetch_catalog_parses_wire_format() {
    let fake = FakeApi::spawn(sample_catalog()).await;
    let catalog = fake.client().fetch_catalog().await.unwrap();

    assert_eq!(catalog.len(), 5);
    assert_eq!(catalog[0].id, ProductId::new(1));
    assert_eq!(catalog[0].price, Price::from_rupees(200));
    assert_eq!(catalog[1].description, None);
    assert_eq!(catalog[2].image, None);
    // No description or image keys at all
    assert_eq!(catalog[3].name, "Parotta & Fish Fry");
    assert_eq!(catalog[3].price.to_string(), "₹90.5");
}

#[tokio::test]
async fn test_catalog_is_cached_until_invalidated() {
    let fake = FakeApi::spawn(sample_catalog()).await;
    let api = fake.client();

    api.fetch_catalog().await.unwrap();
    api.fetch_catalog().await.unwrap();
    assert_eq!(fake.catalog_hits(), 1);

    fake.set_catalog(json!([
        {"id": 9, "name": "Kothu Parotta", "category": "Non-Veg", "price": 110}
    ]));
    // Still served from cache
    assert_eq!(api.fetch_catalog().await.unwrap().len(), 5);

    api.invalidate_catalog().await;
    let fresh = api.fetch_catalog().await.unwrap();
    assert_eq!(fake.catalog_hits(), 2);
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].name, "Kothu Parotta");
}

#[tokio::test]
async fn test_cache_is_shared_between_clones() {
    let fake = FakeApi::spawn(sample_catalog()).await;
    let api = fake.client();
    let clone = api.clone();

    api.fetch_catalog().await.unwrap();
    clone.fetch_catalog().await.unwrap();
    assert_eq!(fake.catalog_hits(), 1);
}

#[tokio::test]
async fn test_server_error_status() {
    let fake = FakeApi::spawn(sample_catalog()).await;
    fake.fail_catalog_with(StatusCode::INTERNAL_SERVER_ERROR);

    let err = fake.client().fetch_catalog().await.unwrap_err();
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("Internal Server Error"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limited_reads_retry_after() {
    let fake = FakeApi::spawn(sample_catalog()).await;
    fake.fail_catalog_with(StatusCode::TOO_MANY_REQUESTS);

    let err = fake.client().fetch_catalog().await.unwrap_err();
    assert!(matches!(err, ApiError::RateLimited(30)));
}

#[tokio::test]
async fn test_malformed_catalog_is_parse_error() {
    let fake = FakeApi::spawn(json!({"foods": []})).await;
    let err = fake.client().fetch_catalog().await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}

#[tokio::test]
async fn test_fetch_reviews() {
    let fake = FakeApi::spawn(sample_catalog()).await;
    let api = fake.client();

    let all = api.fetch_reviews(None).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].display_name(), "Asha");
    assert_eq!(all[2].display_name(), "Anonymous");
    assert_eq!(all[1].food_id, None);

    let curry = api.fetch_reviews(Some(ProductId::new(3))).await.unwrap();
    assert_eq!(curry.len(), 1);
    assert_eq!(curry[0].rating.stars(), 3);
}

#[tokio::test]
async fn test_submit_review_round_trip() {
    let fake = FakeApi::spawn(sample_catalog()).await;
    let form = ReviewForm {
        name: " Asha ".to_string(),
        rating: Some(5),
        comment: "Loved it".to_string(),
        food_id: Some("1".to_string()),
    };

    let outcome = fake.client().submit_review(&form.validate().unwrap()).await;
    assert_eq!(review_status(&outcome), "Feedback submitted!");

    let received = fake.received("/api/submit_review");
    assert_eq!(
        received,
        vec![json!({"name": "Asha", "rating": 5, "comment": "Loved it", "food_id": 1})]
    );
}

#[tokio::test]
async fn test_rejected_review_is_a_reply() {
    let fake = FakeApi::spawn(sample_catalog()).await;
    // Bypasses client-side validation
    let submission = ReviewSubmission {
        name: String::new(),
        rating: Rating::new(4).unwrap(),
        comment: "   ".to_string(),
        food_id: None,
    };

    let outcome = fake.client().submit_review(&submission).await;
    let reply = outcome.as_ref().unwrap();
    assert!(!reply.ok);
    assert_eq!(reply.error.as_deref(), Some("Invalid review data"));
    assert_eq!(review_status(&outcome), "Error: Invalid review data");
    assert!(fake.received("/api/submit_review").is_empty());
}

#[tokio::test]
async fn test_contact_and_bulk() {
    let fake = FakeApi::spawn(sample_catalog()).await;
    let api = fake.client();

    let reply = api
        .submit_contact(&ContactMessage {
            name: "Ravi".to_string(),
            email: Email::parse("ravi@example.com").unwrap(),
            message: "Open on Sundays?".to_string(),
        })
        .await
        .unwrap();
    assert!(reply.ok);

    let reply = api
        .submit_bulk_request(&BulkRequest {
            name: "Ravi".to_string(),
            email: Email::parse("ravi@example.com").unwrap(),
            purpose: String::new(),
        })
        .await
        .unwrap();
    assert!(!reply.ok);
    assert_eq!(reply.error.as_deref(), Some("Missing fields"));

    assert_eq!(fake.received("/api/contact")[0]["email"], "ravi@example.com");
    assert!(fake.received("/api/bulk").is_empty());
}

#[tokio::test]
async fn test_submit_order() {
    let fake = FakeApi::spawn(sample_catalog()).await;
    let api = fake.client();

    let reply = api
        .submit_order(&OrderSubmission {
            address: "12 MG Road".to_string(),
        })
        .await
        .unwrap();
    assert!(reply.ok);

    let reply = api
        .submit_order(&OrderSubmission {
            address: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(reply.error.as_deref(), Some("Address is required"));
    assert_eq!(fake.received("/submit_order"), vec![json!({"address": "12 MG Road"})]);
}
