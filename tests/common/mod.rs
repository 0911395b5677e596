#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "secret";

/// Product name that makes the mock fail the create with a JSON error
pub const FAILING_NAME: &str = "Explode";

/// What the mock sends back for a successful create
#[derive(Debug, Clone, Copy)]
pub enum CreateResponse {
    Product,
    IdOnly,
    Empty,
    PlainText,
}

pub struct MockState {
    products: Vec<Value>,
    next_id: i64,
    users: HashMap<String, (String, String)>,
    // token -> username
    sessions: HashMap<String, String>,
    requests: Vec<String>,
    create_response: CreateResponse,
    // replaces the user record in login and check-session replies
    session_body: Option<Value>,
}

type Shared = Arc<Mutex<MockState>>;

/// In-process stand-in for the inventory server
pub struct MockServer {
    pub port: u16,
    pub base_url: String,
    state: Shared,
}

impl MockServer {
    /// `METHOD /path` for every request received so far
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    pub fn set_create_response(&self, shape: CreateResponse) {
        self.state.lock().unwrap().create_response = shape;
    }

    /// Answer login and check-session with `body` instead of the user record
    pub fn set_session_body(&self, body: Value) {
        self.state.lock().unwrap().session_body = Some(body);
    }

    pub fn product_count(&self) -> usize {
        self.state.lock().unwrap().products.len()
    }

    /// Insert `count` products directly, bypassing the API
    pub fn seed_products(&self, count: i64) {
        let mut state = self.state.lock().unwrap();
        for _ in 0..count {
            let id = state.next_id;
            state.next_id += 1;
            state.products.push(json!({
                "id": id,
                "name": format!("Product {}", id),
                "description": format!("Description {}", id),
                "price": 10.5 + id as f64,
                "stock": id % 8,
                "createdAt": "2024-03-01T10:00:00Z",
                "updatedAt": "2024-03-01T10:00:00Z"
            }));
        }
    }
}

/// Start a mock server on a free port
pub async fn spawn_mock() -> Result<MockServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}/", port);

    let mut users = HashMap::new();
    users.insert(
        ADMIN_USER.to_string(),
        (ADMIN_PASSWORD.to_string(), "Admin".to_string()),
    );
    let state = Arc::new(Mutex::new(MockState {
        products: Vec::new(),
        next_id: 1,
        users,
        sessions: HashMap::new(),
        requests: Vec::new(),
        create_response: CreateResponse::Product,
        session_body: None,
    }));

    let app = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/check-session", get(check_session))
        .route("/api/v1/products", get(list_products).post(create_product))
        .route(
            "/api/v1/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(MockServer { port, base_url, state })
}

async fn record(State(state): State<Shared>, req: Request, next: Next) -> Response {
    let line = format!("{} {}", req.method(), req.uri().path());
    state.lock().unwrap().requests.push(line);
    next.run(req).await
}

#[derive(Deserialize)]
struct CredentialsBody {
    username: String,
    password: String,
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == "session_token")
        .map(|(_, value)| value.to_string())
}

impl MockState {
    fn session_user(&self, headers: &HeaderMap) -> Option<String> {
        session_token(headers).and_then(|token| self.sessions.get(&token).cloned())
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        self.session_user(headers).is_some()
    }

    fn user_json(&self, username: &str) -> Value {
        let role = self
            .users
            .get(username)
            .map(|(_, role)| role.clone())
            .unwrap_or_default();
        if let Some(body) = &self.session_body {
            return body.clone();
        }
        let id = self.users.keys().position(|u| u == username).unwrap_or(0) + 1;
        json!({ "message": "OK", "id": id, "username": username, "role": role })
    }
}

// Plain-text errors, the way a bare Go http.Error answers
fn plain(status: StatusCode, text: &str) -> Response {
    (status, format!("{}\n", text)).into_response()
}

fn unauthorized() -> Response {
    plain(StatusCode::UNAUTHORIZED, "Unauthorized")
}

async fn register(State(state): State<Shared>, Json(body): Json<CredentialsBody>) -> Response {
    let mut state = state.lock().unwrap();
    if state.users.contains_key(&body.username) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "User already exists" })),
        )
            .into_response();
    }
    state
        .users
        .insert(body.username, (body.password, "User".to_string()));
    (StatusCode::CREATED, Json(json!({ "message": "User created" }))).into_response()
}

async fn login(State(state): State<Shared>, Json(body): Json<CredentialsBody>) -> Response {
    let mut state = state.lock().unwrap();
    let valid = state
        .users
        .get(&body.username)
        .is_some_and(|(password, _)| *password == body.password);
    if !valid {
        return plain(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    let token = Uuid::new_v4().simple().to_string();
    state.sessions.insert(token.clone(), body.username.clone());
    let cookie = format!("session_token={}; Path=/; HttpOnly", token);
    ([(header::SET_COOKIE, cookie)], Json(state.user_json(&body.username))).into_response()
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap();
    if let Some(token) = session_token(&headers) {
        state.sessions.remove(&token);
    }
    (
        [(header::SET_COOKIE, "session_token=; Path=/; Max-Age=0".to_string())],
        Json(json!({ "message": "Logged out" })),
    )
        .into_response()
}

async fn check_session(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    match state.session_user(&headers) {
        Some(username) => Json(state.user_json(&username)).into_response(),
        None => unauthorized(),
    }
}

async fn list_products(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if !state.authorized(&headers) {
        return unauthorized();
    }
    Json(Value::Array(state.products.clone())).into_response()
}

async fn get_product(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let state = state.lock().unwrap();
    if !state.authorized(&headers) {
        return unauthorized();
    }
    match state.products.iter().find(|p| p["id"] == id) {
        Some(product) => Json(product.clone()).into_response(),
        None => plain(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn create_product(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    if !state.authorized(&headers) {
        return unauthorized();
    }
    if body["name"] == FAILING_NAME {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Database unavailable" })),
        )
            .into_response();
    }

    let id = state.next_id;
    state.next_id += 1;
    let product = json!({
        "id": id,
        "name": body["name"],
        "description": body["description"],
        "price": body["price"],
        "stock": body["stock"],
        "createdAt": "2024-03-01T10:00:00Z",
        "updatedAt": "2024-03-01T10:00:00Z"
    });
    state.products.push(product.clone());

    match state.create_response {
        CreateResponse::Product => (StatusCode::CREATED, Json(product)).into_response(),
        CreateResponse::IdOnly => (StatusCode::CREATED, Json(json!({ "id": id }))).into_response(),
        CreateResponse::Empty => StatusCode::CREATED.into_response(),
        CreateResponse::PlainText => (StatusCode::CREATED, "created").into_response(),
    }
}

async fn update_product(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if !state.authorized(&headers) {
        return unauthorized();
    }
    match state.products.iter_mut().find(|p| p["id"] == id) {
        Some(product) => {
            for field in ["name", "description", "price", "stock"] {
                product[field] = body[field].clone();
            }
            Json(product.clone()).into_response()
        }
        None => plain(StatusCode::NOT_FOUND, "Product not found"),
    }
}

async fn delete_product(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let mut state = state.lock().unwrap();
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let before = state.products.len();
    state.products.retain(|p| p["id"] != id);
    if state.products.len() == before {
        return plain(StatusCode::NOT_FOUND, "Product not found");
    }
    StatusCode::NO_CONTENT.into_response()
}
