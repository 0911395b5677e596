use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use super::{
    product_path, InventoryApi, CHECK_SESSION_PATH, LOGIN_PATH, LOGOUT_PATH, PRODUCTS_PATH, REGISTER_PATH,
};
use crate::error::ClientError;
use crate::types::{Credentials, Product, ProductDraft, ProductId, SessionUser};

/// `reqwest` client for the inventory API. Cookies set by the server are kept
/// in a jar and sent back on every request.
pub struct HttpApi {
    client: Client,
    base: Url,
    jar: Arc<Jar>,
    log_requests: bool,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = normalize_base(base_url)?;
        let jar = Arc::new(Jar::default());
        let client = Client::builder().cookie_provider(Arc::clone(&jar)).build()?;

        Ok(Self {
            client,
            base,
            jar,
            log_requests: false,
        })
    }

    pub fn with_log_requests(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Seed the jar from a saved `Cookie` header value (`a=1; b=2`)
    pub fn restore_session(&self, cookie_header: &str) {
        for pair in cookie_header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.jar.add_cookie_str(pair, &self.base);
        }
    }

    /// Cookies the jar would send to the API, as a `Cookie` header value
    pub fn session_cookie(&self) -> Option<String> {
        self.jar
            .cookies(&self.base)
            .and_then(|value| value.to_str().ok().map(str::to_string))
            .filter(|value| !value.is_empty())
    }

    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        self.request::<()>(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ClientError> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ClientError> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ClientError> {
        self.request::<()>(Method::DELETE, path, None).await
    }

    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, ClientError> {
        let url = self.base.join(path)?;
        if self.log_requests {
            tracing::debug!("{} {}", method, url);
        }

        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let result = read_body(response).await;
        if let Err(ref e) = result {
            tracing::warn!("{} {} failed: {}", method, path, e);
        }
        result
    }
}

/// Read a response the way every call site expects: unparseable bodies become
/// `{}`, and a non-2xx status becomes an error carrying the body's `message`.
pub async fn read_body(response: Response) -> Result<Value, ClientError> {
    let status = response.status();
    let text = response.text().await?;
    let body = parse_body(&text);

    if !status.is_success() {
        return Err(ClientError::http(status, &body));
    }
    Ok(body)
}

pub fn parse_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::Object(Map::new()))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    Ok(serde_json::from_value(value)?)
}

/// A 2xx from login or check-session means signed in, whatever the body says
fn session_user(value: Value) -> SessionUser {
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::debug!("Session body not a user record: {}", e);
        SessionUser::default()
    })
}

/// Relative joins need a trailing slash on the base path
fn normalize_base(base_url: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(base_url.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[async_trait]
impl InventoryApi for HttpApi {
    async fn register(&self, credentials: &Credentials) -> Result<Value, ClientError> {
        self.post(REGISTER_PATH, credentials).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<SessionUser, ClientError> {
        Ok(session_user(self.post(LOGIN_PATH, credentials).await?))
    }

    async fn logout(&self) -> Result<Value, ClientError> {
        self.request::<()>(Method::POST, LOGOUT_PATH, None).await
    }

    async fn check_session(&self) -> Result<SessionUser, ClientError> {
        Ok(session_user(self.get(CHECK_SESSION_PATH).await?))
    }

    async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
        decode(self.get(PRODUCTS_PATH).await?)
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, ClientError> {
        decode(self.get(&product_path(id)).await?)
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<Value, ClientError> {
        self.post(PRODUCTS_PATH, draft).await
    }

    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<Value, ClientError> {
        self.put(&product_path(id), draft).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<Value, ClientError> {
        self.delete(&product_path(id)).await
    }
}
