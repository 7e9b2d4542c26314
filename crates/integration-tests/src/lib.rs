//! Integration tests for Order Desk.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p order-desk-integration-tests
//! ```
//!
//! Tests run the real client against [`StubApi`], an in-process `axum`
//! server that speaks the store API's envelope format. Nothing external is
//! needed.
//!
//! # Test Categories
//!
//! - `catalog` - Products, categories, cities and areas
//! - `checkout` - Cart persistence and order submission
//! - `orders` - Order listings, stats, health and offline fallbacks

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use order_desk_client::{ApiClient, ClientConfig};

/// First order ID handed out by the stub.
pub const FIRST_ORDER_ID: u64 = 1001;

/// Mutable state behind the stub API.
#[derive(Debug)]
pub struct StubState {
    /// When set, every `/api/*` route except health answers 500.
    pub failing: AtomicBool,
    /// When cleared, health reports `degraded`.
    pub healthy: AtomicBool,
    next_order_id: AtomicU64,
    posted_orders: Mutex<Vec<Value>>,
    requests: Mutex<Vec<String>>,
    products_by_category: Value,
    orders: Value,
}

impl StubState {
    fn new() -> Self {
        Self {
            failing: AtomicBool::new(false),
            healthy: AtomicBool::new(true),
            next_order_id: AtomicU64::new(FIRST_ORDER_ID),
            posted_orders: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
            products_by_category: products_fixture(),
            orders: orders_fixture(),
        }
    }

    /// Make every data route fail (or recover).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Order payloads received so far.
    pub fn posted_orders(&self) -> Vec<Value> {
        self.posted_orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Paths (with query strings) of every request received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests whose path starts with `prefix`.
    pub fn request_count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|path| path.starts_with(prefix))
            .count()
    }

    fn record(&self, path: String) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path);
    }

    fn check(&self, path: String) -> Result<(), Response> {
        self.record(path);
        if self.failing.load(Ordering::SeqCst) {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "error": "Database unavailable"})),
            )
                .into_response());
        }
        Ok(())
    }
}

/// An in-process stub of the store API bound to a random local port.
pub struct StubApi {
    pub addr: SocketAddr,
    pub state: Arc<StubState>,
    handle: JoinHandle<()>,
}

impl StubApi {
    /// Start the stub server.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn() -> Self {
        let state = Arc::new(StubState::new());
        let app = router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub API");
        let addr = listener.local_addr().expect("Stub API has no local address");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Stub API stopped");
            }
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL of the stub.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at the stub.
    ///
    /// # Panics
    ///
    /// Panics if the stub URL is rejected, which would be a bug.
    pub fn config(&self, data_dir: &std::path::Path) -> ClientConfig {
        let mut config = ClientConfig::new(&self.base_url()).expect("Stub URL is valid");
        config.data_dir = data_dir.to_path_buf();
        config
    }

    /// An API client pointing at the stub.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.config(std::path::Path::new("."))).expect("Failed to build client")
    }
}

impl Drop for StubApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn router(state: Arc<StubState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/products", get(products))
        .route("/api/products/grouped-by-category", get(products_grouped))
        .route("/api/categories", get(categories))
        .route("/api/cities", get(cities))
        .route("/api/areas/{city}", get(areas))
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/stats", get(stats))
        .with_state(state)
}

fn ok(data: Value) -> Response {
    let count = data.as_array().map(Vec::len);
    Json(json!({"success": true, "data": data, "count": count})).into_response()
}

async fn health(State(state): State<Arc<StubState>>) -> Json<Value> {
    state.record("/api/health".to_string());
    let status = if state.healthy.load(Ordering::SeqCst) {
        "healthy"
    } else {
        "degraded"
    };
    Json(json!({"status": status}))
}

async fn products(State(state): State<Arc<StubState>>) -> Response {
    if let Err(response) = state.check("/api/products".to_string()) {
        return response;
    }
    let all: Vec<Value> = state
        .products_by_category
        .as_object()
        .into_iter()
        .flat_map(|groups| groups.values())
        .filter_map(Value::as_array)
        .flatten()
        .cloned()
        .collect();
    ok(Value::Array(all))
}

async fn products_grouped(State(state): State<Arc<StubState>>) -> Response {
    if let Err(response) = state.check("/api/products/grouped-by-category".to_string()) {
        return response;
    }
    ok(state.products_by_category.clone())
}

async fn categories(State(state): State<Arc<StubState>>) -> Response {
    if let Err(response) = state.check("/api/categories".to_string()) {
        return response;
    }
    let names: Vec<Value> = state
        .products_by_category
        .as_object()
        .into_iter()
        .flat_map(|groups| groups.keys())
        .map(|name| Value::String(name.clone()))
        .collect();
    ok(Value::Array(names))
}

async fn cities(State(state): State<Arc<StubState>>) -> Response {
    if let Err(response) = state.check("/api/cities".to_string()) {
        return response;
    }
    ok(json!(["Mumbai", "Pune", "New Delhi"]))
}

async fn areas(State(state): State<Arc<StubState>>, Path(city): Path<String>) -> Response {
    if let Err(response) = state.check(format!("/api/areas/{city}")) {
        return response;
    }
    let areas = match city.as_str() {
        "Mumbai" => json!(["Andheri", "Bandra", "Powai"]),
        "New Delhi" => json!(["Connaught Place", "Saket"]),
        _ => json!([]),
    };
    ok(areas)
}

async fn list_orders(
    State(state): State<Arc<StubState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut keys: Vec<_> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    keys.sort();
    if let Err(response) = state.check(format!("/api/orders?{}", keys.join("&"))) {
        return response;
    }

    let limit = params
        .get("limit")
        .and_then(|limit| limit.parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    let orders: Vec<Value> = state
        .orders
        .as_array()
        .into_iter()
        .flatten()
        .filter(|order| {
            params
                .get("phone")
                .is_none_or(|phone| order["Phone"].as_str() == Some(phone.as_str()))
        })
        .filter(|order| {
            params
                .get("payment_status")
                .is_none_or(|status| order["PaymentStatus"].as_str() == Some(status.as_str()))
        })
        .take(limit)
        .cloned()
        .collect();
    ok(Value::Array(orders))
}

async fn create_order(State(state): State<Arc<StubState>>, Json(order): Json<Value>) -> Response {
    if let Err(response) = state.check("/api/orders".to_string()) {
        return response;
    }
    if order["items"].as_array().is_none_or(Vec::is_empty) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "Order has no items"})),
        )
            .into_response();
    }

    let order_id = state.next_order_id.fetch_add(1, Ordering::SeqCst);
    state
        .posted_orders
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(order);
    (
        StatusCode::CREATED,
        Json(json!({"success": true, "order_id": order_id, "message": "Order created"})),
    )
        .into_response()
}

async fn stats(State(state): State<Arc<StubState>>) -> Response {
    if let Err(response) = state.check("/api/stats".to_string()) {
        return response;
    }
    Json(json!({
        "success": true,
        "data": {
            "today_orders": 4,
            "monthly_revenue": 48250.5,
            "unpaid_orders": 1,
            "total_customers": 37,
            "total_orders": 212,
            "total_products": 6,
            "average_order_value": 1206.26
        }
    }))
    .into_response()
}

fn products_fixture() -> Value {
    json!({
        "Hampers": [
            {"ProductID": 1, "ProductName": "Premium Hamper", "UniPrice": 1999, "Stock": 5,
             "Description": "Assorted sweets and dry fruits"},
            {"ProductID": 2, "ProductName": "Corporate Hamper", "UniPrice": 2499.5, "Stock": 0}
        ],
        "Sweets": [
            {"ProductID": 3, "ProductName": "Kaju Katli 500g", "UniPrice": "450.00", "Stock": 20,
             "Category": "Sweets"},
            {"ProductID": "SW-4", "ProductName": "Motichoor Ladoo", "UniPrice": 320, "Stock": 2}
        ]
    })
}

fn orders_fixture() -> Value {
    json!([
        {
            "OrderID": 501, "OrderDate": "2024-03-02", "Ordertime": "10:05:13",
            "CustomerName": "Asha Verma", "Phone": "9820012345",
            "CustomerCity": "Mumbai", "CustomerArea": "Bandra",
            "items": [{"ProductName": "Premium Hamper", "Quantity": 2}],
            "TotalAmount": 3998, "PaymentStatus": "Paid", "delivery_date": "2024-03-03"
        },
        {
            "OrderID": 502, "OrderDate": "2024-03-02", "Ordertime": "12:40:00",
            "CustomerName": "Rahul Mehta", "Phone": "9811122233",
            "CustomerCity": "New Delhi", "CustomerArea": "Saket",
            "items": [{"ProductName": "Kaju Katli 500g", "Quantity": 1}],
            "TotalAmount": 450, "PaymentStatus": "Unpaid", "delivery_date": "2024-03-04"
        },
        {
            "OrderID": 503, "OrderDate": "2024-03-03", "Ordertime": "09:00:00",
            "CustomerName": "Asha Verma", "Phone": "9820012345",
            "CustomerCity": "Mumbai", "CustomerArea": "Powai",
            "items": [{"ProductName": "Motichoor Ladoo", "Quantity": 2}],
            "TotalAmount": 640, "PaymentStatus": "Cash on Delivery", "delivery_date": "2024-03-04"
        }
    ])
}
