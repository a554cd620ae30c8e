//! Integration tests for Pocketcart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pocketcart-integration-tests
//! ```
//!
//! No network access is needed. Each test starts a [`FakeStore`], an `axum`
//! server on an ephemeral local port that answers like the Fake Store API,
//! and points the real client at it.
//!
//! # Test Categories
//!
//! - `catalog` - Product and category fetching
//! - `account` - Login and signup status handling
//! - `shopping_flow` - A full session from login to checkout

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use pocketcart_app::config::AppConfig;
use pocketcart_app::session::ShopSession;
use pocketcart_app::state::AppState;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// How `POST /auth/login` answers.
#[derive(Debug, Clone)]
pub enum LoginReply {
    Token(String),
    Unauthorized,
    ServerError,
    MissingToken,
}

/// How `POST /users` answers.
#[derive(Debug, Clone)]
pub enum SignupReply {
    Created(u64),
    Rejected,
    MissingId,
}

/// Everything the fake API returns.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub products: Value,
    pub categories: Value,
    pub products_status: StatusCode,
    pub categories_status: StatusCode,
    pub login: LoginReply,
    pub signup: SignupReply,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            products: sample_products(),
            categories: json!(["electronics", "jewelery", "men's clothing"]),
            products_status: StatusCode::OK,
            categories_status: StatusCode::OK,
            login: LoginReply::Token("test-token".to_string()),
            signup: SignupReply::Created(21),
        }
    }
}

/// A trimmed copy of the real catalog.
#[must_use]
pub fn sample_products() -> Value {
    json!([
        {
            "id": 1,
            "title": "Fjallraven - Foldsack No. 1 Backpack",
            "price": 109.95,
            "description": "Your perfect pack for everyday use",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
            "rating": {"rate": 3.9, "count": 120}
        },
        {
            "id": 2,
            "title": "Mens Casual Premium Slim Fit T-Shirts",
            "price": 22.3,
            "description": "Slim-fitting style",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/71-3HjGNDUL._AC_SY879._SX._UX._SY._UY_.jpg",
            "rating": {"rate": 4.1, "count": 259}
        },
        {
            "id": 5,
            "title": "John Hardy Women's Legends Naga Bracelet",
            "price": 695,
            "description": "From our Legends Collection",
            "category": "jewelery",
            "image": "https://fakestoreapi.com/img/71pWzhdJNwL._AC_UL640_QL65_ML3_.jpg",
            "rating": {"rate": 4.6, "count": 400}
        },
        {
            "id": 9,
            "title": "WD 2TB Elements Portable External Hard Drive",
            "price": 64,
            "description": "USB 3.0 and USB 2.0 compatibility",
            "category": "electronics",
            "image": "https://fakestoreapi.com/img/61IBBVJvSDL._AC_SY879_.jpg",
            "rating": {"rate": 3.3, "count": 203}
        },
        {
            "id": 14,
            "title": "Samsung 49-Inch CHG90 Curved Gaming Monitor",
            "price": 999.99,
            "description": "49 inch super ultrawide",
            "category": "electronics",
            "image": "https://fakestoreapi.com/img/81Zt42ioCgL._AC_SX679_.jpg",
            "rating": {"rate": 2.2, "count": 140}
        }
    ])
}

/// A request body the fake API received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: &'static str,
    pub body: Value,
}

struct Shared {
    scenario: Mutex<Scenario>,
    requests: Mutex<Vec<Recorded>>,
}

impl Shared {
    fn scenario(&self) -> Scenario {
        self.scenario.lock().expect("scenario lock poisoned").clone()
    }

    fn record(&self, path: &'static str, body: Value) {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(Recorded { path, body });
    }
}

/// A running fake Fake Store API. The server stops when this is dropped.
pub struct FakeStore {
    addr: SocketAddr,
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl FakeStore {
    /// Start a server answering with `scenario`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start(scenario: Scenario) -> Self {
        let shared = Arc::new(Shared {
            scenario: Mutex::new(scenario),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/products", get(products))
            .route("/products/categories", get(categories))
            .route("/products/{id}", get(product))
            .route("/auth/login", post(login))
            .route("/users", post(signup))
            .with_state(Arc::clone(&shared));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake store");
        let addr = listener.local_addr().expect("Failed to read local address");

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, shared, task }
    }

    /// The base URL to point the client at.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Change how the server answers from now on.
    ///
    /// # Panics
    ///
    /// Panics if a handler panicked while holding the scenario.
    pub fn update(&self, change: impl FnOnce(&mut Scenario)) {
        change(&mut self.shared.scenario.lock().expect("scenario lock poisoned"));
    }

    /// Bodies received so far, in arrival order.
    ///
    /// # Panics
    ///
    /// Panics if a handler panicked while holding the log.
    #[must_use]
    pub fn requests(&self) -> Vec<Recorded> {
        self.shared
            .requests
            .lock()
            .expect("request log poisoned")
            .clone()
    }

    /// Configuration pointing at this server.
    ///
    /// # Panics
    ///
    /// Panics if the server URL is rejected, which would be a bug.
    #[must_use]
    pub fn config(&self) -> AppConfig {
        AppConfig::for_api_url(&self.url()).expect("Fake store URL is valid")
    }

    /// A fresh session talking to this server.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn session(&self) -> ShopSession {
        let state = AppState::new(self.config()).expect("Failed to build app state");
        ShopSession::new(state)
    }
}

impl Drop for FakeStore {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A base URL where nothing is listening.
///
/// # Panics
///
/// Panics if no local port can be bound.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe port");
    let addr = listener.local_addr().expect("Failed to read local address");
    drop(listener);
    format!("http://{addr}")
}

// =============================================================================
// Handlers
// =============================================================================

type SharedState = State<Arc<Shared>>;

async fn products(State(shared): SharedState) -> Response {
    let scenario = shared.scenario();
    if scenario.products_status.is_success() {
        Json(scenario.products).into_response()
    } else {
        (scenario.products_status, "products unavailable").into_response()
    }
}

async fn categories(State(shared): SharedState) -> Response {
    let scenario = shared.scenario();
    if scenario.categories_status.is_success() {
        Json(scenario.categories).into_response()
    } else {
        (scenario.categories_status, "categories unavailable").into_response()
    }
}

/// Unknown ids get an empty 200, as the real API does. Follows
/// `products_status` like the list endpoint.
async fn product(State(shared): SharedState, Path(id): Path<u64>) -> Response {
    let scenario = shared.scenario();
    if !scenario.products_status.is_success() {
        return (scenario.products_status, "products unavailable").into_response();
    }
    let found = scenario.products.as_array().and_then(|items| {
        items
            .iter()
            .find(|item| item.get("id").and_then(Value::as_u64) == Some(id))
            .cloned()
    });

    match found {
        Some(item) => Json(item).into_response(),
        None => (StatusCode::OK, "").into_response(),
    }
}

async fn login(State(shared): SharedState, Json(body): Json<Value>) -> Response {
    shared.record("/auth/login", body);

    match shared.scenario().login {
        LoginReply::Token(token) => Json(json!({ "token": token })).into_response(),
        LoginReply::Unauthorized => {
            (StatusCode::UNAUTHORIZED, "username or password is incorrect").into_response()
        }
        LoginReply::ServerError => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
        LoginReply::MissingToken => Json(json!({ "status": "ok" })).into_response(),
    }
}

async fn signup(State(shared): SharedState, Json(body): Json<Value>) -> Response {
    shared.record("/users", body);

    match shared.scenario().signup {
        SignupReply::Created(id) => Json(json!({ "id": id })).into_response(),
        SignupReply::Rejected => (StatusCode::BAD_REQUEST, "invalid user").into_response(),
        SignupReply::MissingId => Json(json!({})).into_response(),
    }
}
