use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::HttpApi;
use crate::config::config;
use crate::error::ClientError;
use crate::types::SessionUser;

const SESSION_FILE: &str = "session.json";

/// Session cookie kept between one-shot commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFile {
    pub base_url: String,
    pub cookie: String,
    pub user: Option<SessionUser>,
    pub saved_at: DateTime<Utc>,
}

impl SessionFile {
    pub fn new(base_url: &str, cookie: String, user: Option<SessionUser>) -> Self {
        Self {
            base_url: base_url.to_string(),
            cookie,
            user,
            saved_at: Utc::now(),
        }
    }
}

pub fn get_config_dir() -> Result<PathBuf, ClientError> {
    let config_dir = if let Some(custom_dir) = &config().ui.config_dir {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME")
            .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("tienda")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_session() -> Result<Option<SessionFile>, ClientError> {
    read_session(&get_config_dir()?)
}

pub fn save_session(session: &SessionFile) -> Result<(), ClientError> {
    write_session(&get_config_dir()?, session)
}

pub fn clear_session() -> Result<(), ClientError> {
    remove_session(&get_config_dir()?)
}

fn read_session(dir: &Path) -> Result<Option<SessionFile>, ClientError> {
    let session_file = dir.join(SESSION_FILE);

    if !session_file.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(session_file)?;
    let session: SessionFile = serde_json::from_str(&content)?;
    Ok(Some(session))
}

fn write_session(dir: &Path, session: &SessionFile) -> Result<(), ClientError> {
    let content = serde_json::to_string_pretty(session)?;
    fs::write(dir.join(SESSION_FILE), content)?;
    Ok(())
}

fn remove_session(dir: &Path) -> Result<(), ClientError> {
    let session_file = dir.join(SESSION_FILE);

    if session_file.exists() {
        fs::remove_file(session_file)?;
    }
    Ok(())
}

/// Client for `base_url`, carrying the saved cookie if it was issued by the
/// same server
pub fn connect(base_url: &str) -> Result<HttpApi, ClientError> {
    let api = HttpApi::new(base_url)?.with_log_requests(config().api.log_requests);

    match load_session() {
        Ok(Some(session)) if same_server(&session.base_url, &api) => {
            tracing::debug!("Restoring session saved at {}", session.saved_at);
            api.restore_session(&session.cookie);
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("Ignoring unreadable session file: {}", e),
    }

    Ok(api)
}

/// Write the jar's current cookie back to disk
pub fn persist(api: &HttpApi, user: Option<SessionUser>) -> Result<(), ClientError> {
    match api.session_cookie() {
        Some(cookie) => save_session(&SessionFile::new(api.base_url().as_str(), cookie, user)),
        None => clear_session(),
    }
}

fn same_server(saved: &str, api: &HttpApi) -> bool {
    HttpApi::new(saved)
        .map(|saved| saved.base_url() == api.base_url())
        .unwrap_or(false)
}
