// Client error types
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Fallback shown when an error response carries no `message`
pub const DEFAULT_ERROR_MESSAGE: &str = "Operation failed";

/// Everything that can go wrong between a user action and the inventory API
#[derive(Debug, Error)]
pub enum ClientError {
    // Non-2xx response; message comes from the body when it has one
    #[error("{message}")]
    Http { status: StatusCode, message: String },

    // Connection refused, reset, TLS failure...
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    // Caught before any request is sent
    #[error("invalid product: {0}")]
    Validation(ValidationErrors),

    // Body was accepted but does not have the expected shape
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid API url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("session store error: {0}")]
    SessionStore(#[from] std::io::Error),

    #[error("no product is open for editing")]
    NoOpenModal,
}

impl ClientError {
    /// Build an HTTP error from a status and a (possibly degraded) JSON body
    pub fn http(status: StatusCode, body: &Value) -> Self {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_ERROR_MESSAGE)
            .to_string();
        ClientError::Http { status, message }
    }

    /// HTTP status, when the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Short machine-readable code for JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Http { status, .. } => match status.as_u16() {
                401 => "UNAUTHORIZED",
                403 => "FORBIDDEN",
                404 => "NOT_FOUND",
                409 => "CONFLICT",
                400..=499 => "BAD_REQUEST",
                _ => "SERVER_ERROR",
            },
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::Validation(_) => "VALIDATION_ERROR",
            ClientError::Decode(_) => "INVALID_RESPONSE",
            ClientError::InvalidUrl(_) => "INVALID_URL",
            ClientError::SessionStore(_) => "SESSION_STORE_ERROR",
            ClientError::NoOpenModal => "NO_OPEN_MODAL",
        }
    }
}

impl From<ValidationErrors> for ClientError {
    fn from(errors: ValidationErrors) -> Self {
        ClientError::Validation(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn http_error_uses_body_message() {
        let err = ClientError::http(StatusCode::CONFLICT, &json!({ "message": "User already exists" }));
        assert_eq!(err.to_string(), "User already exists");
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[test]
    fn http_error_falls_back_on_degraded_body() {
        let err = ClientError::http(StatusCode::INTERNAL_SERVER_ERROR, &json!({}));
        assert_eq!(err.to_string(), DEFAULT_ERROR_MESSAGE);
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn unauthorized_is_detected() {
        let err = ClientError::http(StatusCode::UNAUTHORIZED, &json!({ "message": "" }));
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), DEFAULT_ERROR_MESSAGE);
    }
}
