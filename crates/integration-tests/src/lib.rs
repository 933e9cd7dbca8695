//! Integration tests for the Tiffin storefront client.
//!
//! Tests run against [`FakeApi`], an in-process axum server that speaks the
//! storefront wire format (JSON catalog and reviews, `{ ok, error? }` form
//! replies). Nothing external needs to be running:
//!
//! ```bash
//! cargo test -p tiffin-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_client` - catalog caching, reviews, form replies, error statuses
//! - `cart_persistence` - cart state on disk across store instances
//! - `storefront_flow` - search, filtering and cart actions end to end

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tiffin_storefront::{ApiClient, ApiConfig};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// The catalog most tests use, in the server's wire format.
#[must_use]
pub fn sample_catalog() -> Value {
    json!([
        {"id": 1, "name": "Biryani", "category": "Non-Veg", "price": 200,
         "description": "Dum-cooked with basmati", "image": "biryani.jpg"},
        {"id": 2, "name": "Mini Meals", "category": "Veg", "price": 50,
         "description": null, "image": "meals.jpg"},
        {"id": 3, "name": "Chicken Curry", "category": "Non-Veg", "price": 130,
         "description": "Kerala style", "image": null},
        {"id": 4, "name": "Parotta & Fish Fry", "category": "Non-Veg", "price": 90.5},
        {"id": 7, "name": "Veg Biryani", "category": "Veg", "price": 60,
         "description": null, "image": "veg-biryani.jpg"}
    ])
}

/// Reviews newest first, as `GET /api/reviews` lists them.
#[must_use]
pub fn sample_reviews() -> Value {
    json!([
        {"id": 3, "food_id": 1, "name": "Asha", "rating": 5,
         "comment": "Best biryani in town", "created_at": "2024-05-03T19:02:11.482113"},
        {"id": 2, "food_id": null, "name": "Anonymous", "rating": 4,
         "comment": "Quick delivery", "created_at": "2024-05-02T13:45:00"},
        {"id": 1, "food_id": 3, "name": "", "rating": 3,
         "comment": "A bit too spicy", "created_at": "2024-05-01T12:30:00"}
    ])
}

/// Mutable server state shared with the test.
#[derive(Default)]
struct Shared {
    catalog: Mutex<Value>,
    reviews: Mutex<Value>,
    catalog_hits: AtomicUsize,
    /// Status `GET /api/foods` answers with instead of the catalog.
    catalog_failure: Mutex<Option<StatusCode>>,
    /// Every POST body, tagged with its path.
    received: Mutex<Vec<(String, Value)>>,
}

/// An in-process storefront API.
///
/// The server task is aborted when the value is dropped.
pub struct FakeApi {
    addr: SocketAddr,
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl FakeApi {
    /// Serve `catalog` and [`sample_reviews`] on a free local port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    #[allow(clippy::unwrap_used)]
    pub async fn spawn(catalog: Value) -> Self {
        let shared = Arc::new(Shared {
            catalog: Mutex::new(catalog),
            reviews: Mutex::new(sample_reviews()),
            ..Shared::default()
        });

        let router = Router::new()
            .route("/api/foods", get(foods))
            .route("/api/reviews", get(reviews))
            .route("/api/submit_review", post(submit_review))
            .route("/api/contact", post(contact))
            .route("/api/bulk", post(bulk))
            .route("/submit_order", post(submit_order))
            .with_state(Arc::clone(&shared));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self { addr, shared, task }
    }

    /// Base URL of the running server.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// A client for this server with default cache settings.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&ApiConfig::new(&self.base_url()).unwrap()).unwrap()
    }

    /// How many times the catalog endpoint has been called.
    #[must_use]
    pub fn catalog_hits(&self) -> usize {
        self.shared.catalog_hits.load(Ordering::SeqCst)
    }

    /// Swap the served catalog.
    pub fn set_catalog(&self, catalog: Value) {
        *lock(&self.shared.catalog) = catalog;
    }

    /// Make `GET /api/foods` answer `status` from now on.
    pub fn fail_catalog_with(&self, status: StatusCode) {
        *lock(&self.shared.catalog_failure) = Some(status);
    }

    /// Bodies posted to `path`, oldest first.
    #[must_use]
    pub fn received(&self, path: &str) -> Vec<Value> {
        lock(&self.shared.received)
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Handlers
// =============================================================================

type AppState = State<Arc<Shared>>;

async fn foods(State(shared): AppState) -> Response {
    shared.catalog_hits.fetch_add(1, Ordering::SeqCst);

    let failure = *lock(&shared.catalog_failure);
    match failure {
        Some(status) if status == StatusCode::TOO_MANY_REQUESTS => {
            let mut response = (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static("30"));
            response
        }
        Some(status) => (status, "<h1>Internal Server Error</h1>").into_response(),
        None => Json(lock(&shared.catalog).clone()).into_response(),
    }
}

#[derive(Deserialize)]
struct ReviewQuery {
    food_id: Option<i64>,
}

async fn reviews(State(shared): AppState, Query(query): Query<ReviewQuery>) -> Json<Value> {
    let all = lock(&shared.reviews).clone();
    let Some(food_id) = query.food_id else {
        return Json(all);
    };

    let filtered: Vec<Value> = all
        .as_array()
        .into_iter()
        .flatten()
        .filter(|r| r["food_id"].as_i64() == Some(food_id))
        .cloned()
        .collect();
    Json(Value::Array(filtered))
}

async fn submit_review(State(shared): AppState, Json(body): Json<Value>) -> Response {
    let rating = body["rating"].as_i64().unwrap_or(0);
    let comment = text(&body, "comment");
    if !(1..=5).contains(&rating) || comment.is_empty() {
        return rejected("Invalid review data");
    }
    record(&shared, "/api/submit_review", body)
}

async fn contact(State(shared): AppState, Json(body): Json<Value>) -> Response {
    if ["name", "email", "message"].iter().any(|k| text(&body, k).is_empty()) {
        return rejected("Missing fields");
    }
    record(&shared, "/api/contact", body)
}

async fn bulk(State(shared): AppState, Json(body): Json<Value>) -> Response {
    if ["name", "email", "purpose"].iter().any(|k| text(&body, k).is_empty()) {
        return rejected("Missing fields");
    }
    record(&shared, "/api/bulk", body)
}

async fn submit_order(State(shared): AppState, Json(body): Json<Value>) -> Response {
    if text(&body, "address").is_empty() {
        return rejected("Address is required");
    }
    record(&shared, "/submit_order", body)
}

fn text<'a>(body: &'a Value, key: &str) -> &'a str {
    body[key].as_str().map_or("", str::trim)
}

fn record(shared: &Shared, path: &str, body: Value) -> Response {
    lock(&shared.received).push((path.to_string(), body));
    Json(json!({"ok": true})).into_response()
}

fn rejected(error: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"ok": false, "error": error}))).into_response()
}
