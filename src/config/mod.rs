use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::view::state::PAGE_SIZE_CHOICES;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub view: ViewConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub log_requests: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    pub default_page_size: usize,
    pub search_debounce_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub notification_ms: u64,
    pub config_dir: Option<String>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("TIENDA_API_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = v.trim().to_string();
            }
        }
        if let Ok(v) = env::var("TIENDA_LOG_REQUESTS") {
            self.api.log_requests = v.parse().unwrap_or(self.api.log_requests);
        }

        if let Ok(v) = env::var("TIENDA_PAGE_SIZE") {
            match v.parse::<usize>() {
                Ok(size) if PAGE_SIZE_CHOICES.contains(&size) => self.view.default_page_size = size,
                _ => tracing::warn!("Ignoring TIENDA_PAGE_SIZE={}, expected one of {:?}", v, PAGE_SIZE_CHOICES),
            }
        }
        if let Ok(v) = env::var("TIENDA_SEARCH_DEBOUNCE_MS") {
            self.view.search_debounce_ms = v.parse().unwrap_or(self.view.search_debounce_ms);
        }

        if let Ok(v) = env::var("TIENDA_NOTIFICATION_MS") {
            self.ui.notification_ms = v.parse().unwrap_or(self.ui.notification_ms);
        }
        if let Ok(v) = env::var("TIENDA_CONFIG_DIR") {
            self.ui.config_dir = Some(v);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8080/".to_string(),
                log_requests: true,
            },
            view: ViewConfig {
                default_page_size: 10,
                search_debounce_ms: 300,
            },
            ui: UiConfig {
                notification_ms: 3000,
                config_dir: None,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "http://localhost:8080/".to_string(),
                log_requests: false,
            },
            view: ViewConfig {
                default_page_size: 10,
                search_debounce_ms: 300,
            },
            ui: UiConfig {
                notification_ms: 3000,
                config_dir: None,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<ClientConfig> = Lazy::new(ClientConfig::from_env);

pub fn config() -> &'static ClientConfig {
    &CONFIG
}
