pub mod client;

pub use client::HttpApi;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ClientError;
use crate::types::{Credentials, Product, ProductDraft, ProductId, SessionUser};

pub const REGISTER_PATH: &str = "api/auth/register";
pub const LOGIN_PATH: &str = "api/auth/login";
pub const LOGOUT_PATH: &str = "api/auth/logout";
pub const CHECK_SESSION_PATH: &str = "api/auth/check-session";
pub const PRODUCTS_PATH: &str = "api/v1/products";

/// Name of the cookie the server issues on login
pub const SESSION_COOKIE: &str = "session_token";

pub fn product_path(id: ProductId) -> String {
    format!("{}/{}", PRODUCTS_PATH, id)
}

/// The inventory REST surface as the page controller sees it.
///
/// Mutations return the raw response body: callers reload afterwards and do
/// not depend on its shape.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    async fn register(&self, credentials: &Credentials) -> Result<Value, ClientError>;

    async fn login(&self, credentials: &Credentials) -> Result<SessionUser, ClientError>;

    async fn logout(&self) -> Result<Value, ClientError>;

    async fn check_session(&self) -> Result<SessionUser, ClientError>;

    async fn list_products(&self) -> Result<Vec<Product>, ClientError>;

    async fn get_product(&self, id: ProductId) -> Result<Product, ClientError>;

    async fn create_product(&self, draft: &ProductDraft) -> Result<Value, ClientError>;

    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<Value, ClientError>;

    async fn delete_product(&self, id: ProductId) -> Result<Value, ClientError>;
}
