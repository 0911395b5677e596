use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::api::InventoryApi;
use crate::controller::Confirm;
use crate::error::ClientError;
use crate::types::{Credentials, Product, ProductDraft, ProductId, SessionUser};

/// In-memory inventory API for controller tests. Records every call by name
/// (`list`, `get 3`, `update 3`...) and can be told to fail the next call of
/// a given kind.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    products: Vec<Product>,
    users: HashMap<String, String>,
    session: Option<SessionUser>,
    calls: Vec<String>,
    failures: HashMap<String, (u16, String)>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Products `1..=count`, all in stock
    pub fn with_products(count: i64) -> Self {
        let api = Self::new();
        {
            let mut state = api.state.lock().unwrap();
            state.products = (1..=count).map(sample_product).collect();
        }
        api
    }

    /// Pretend a session cookie is already present
    pub fn sign_in(&self, username: &str, role: &str) {
        self.state.lock().unwrap().session = Some(SessionUser {
            id: 1,
            username: username.to_string(),
            role: role.to_string(),
        });
    }

    pub fn fail_next(&self, op: &str, status: u16, message: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(op.to_string(), (status, message.to_string()));
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn record(&self, op: &str, call: String) -> Result<std::sync::MutexGuard<'_, FakeState>, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.failures.remove(op) {
            Some((status, message)) => Err(http_error(status, &message)),
            None => Ok(state),
        }
    }
}

fn sample_product(id: i64) -> Product {
    Product {
        id,
        name: format!("Product {}", id),
        description: format!("Description {}", id),
        price: Decimal::new(id * 100 + 99, 2),
        stock: id * 3 + 1,
        created_at: None,
        updated_at: None,
    }
}

fn http_error(status: u16, message: &str) -> ClientError {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    ClientError::http(status, &json!({ "message": message }))
}

fn not_found() -> ClientError {
    http_error(404, "Product not found")
}

#[async_trait]
impl InventoryApi for FakeApi {
    async fn register(&self, credentials: &Credentials) -> Result<Value, ClientError> {
        let mut state = self.record("register", "register".to_string())?;
        if state.users.contains_key(&credentials.username) {
            return Err(http_error(409, "User already exists"));
        }
        state
            .users
            .insert(credentials.username.clone(), credentials.password.clone());
        Ok(json!({ "message": "User created" }))
    }

    async fn login(&self, credentials: &Credentials) -> Result<SessionUser, ClientError> {
        let mut state = self.record("login", "login".to_string())?;
        match state.users.get(&credentials.username) {
            Some(password) if *password == credentials.password => {
                let user = SessionUser {
                    id: state.users.len() as i64,
                    username: credentials.username.clone(),
                    role: "User".to_string(),
                };
                state.session = Some(user.clone());
                Ok(user)
            }
            _ => Err(http_error(401, "Invalid credentials")),
        }
    }

    async fn logout(&self) -> Result<Value, ClientError> {
        let mut state = self.record("logout", "logout".to_string())?;
        state.session = None;
        Ok(json!({ "message": "Logged out" }))
    }

    async fn check_session(&self) -> Result<SessionUser, ClientError> {
        let state = self.record("check-session", "check-session".to_string())?;
        state.session.clone().ok_or_else(|| http_error(401, "Unauthorized"))
    }

    async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
        let state = self.record("list", "list".to_string())?;
        Ok(state.products.clone())
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, ClientError> {
        let state = self.record("get", format!("get {}", id))?;
        state.products.iter().find(|p| p.id == id).cloned().ok_or_else(not_found)
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<Value, ClientError> {
        let mut state = self.record("create", "create".to_string())?;
        let id = state.products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        state.products.push(Product {
            id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            price: draft.price,
            stock: draft.stock,
            created_at: None,
            updated_at: None,
        });
        // Some servers answer with the id only; callers must not care
        Ok(json!({ "id": id }))
    }

    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<Value, ClientError> {
        let mut state = self.record("update", format!("update {}", id))?;
        let product = state.products.iter_mut().find(|p| p.id == id).ok_or_else(not_found)?;
        product.name = draft.name.clone();
        product.description = draft.description.clone();
        product.price = draft.price;
        product.stock = draft.stock;
        Ok(json!({ "message": "Product updated" }))
    }

    async fn delete_product(&self, id: ProductId) -> Result<Value, ClientError> {
        let mut state = self.record("delete", format!("delete {}", id))?;
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        if state.products.len() == before {
            return Err(not_found());
        }
        Ok(json!({}))
    }
}

/// Confirm prompt with canned answers; answers `false` once they run out
#[derive(Default)]
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirm for ScriptedConfirm {
    async fn confirm(&self, message: &str) -> bool {
        self.prompts.lock().unwrap().push(message.to_string());
        self.answers.lock().unwrap().pop_front().unwrap_or(false)
    }
}
