//! API request and response types.

use serde::Serialize;

use crate::session::{SessionId, SessionValue};

/// Response describing the caller's session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfoResponse {
    pub session_id: String,
}

impl SessionInfoResponse {
    pub fn new(id: &SessionId) -> Self {
        Self {
            session_id: id.to_string(),
        }
    }
}

/// One stored key and its value.
#[derive(Debug, Clone, Serialize)]
pub struct KeyValueResponse {
    pub key: String,
    /// Variant name of the stored value (e.g. "string", "integer").
    pub kind: &'static str,
    pub value: serde_json::Value,
}

impl KeyValueResponse {
    pub fn new(key: impl Into<String>, value: &SessionValue) -> Self {
        Self {
            key: key.into(),
            kind: value.kind(),
            value: value.to_json(),
        }
    }
}

/// Visit counter after an increment.
#[derive(Debug, Clone, Serialize)]
pub struct VisitsResponse {
    pub session_id: String,
    pub visits: i64,
}

/// Generic API error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "KEY_NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn key_not_found(key: &str) -> Self {
        Self::new("KEY_NOT_FOUND", format!("Key '{}' not found", key))
    }

    pub fn engine_closed() -> Self {
        Self::new("ENGINE_CLOSED", "Session engine has been closed")
    }

    pub fn session_not_found() -> Self {
        Self::new("SESSION_NOT_FOUND", "Session no longer exists")
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new("TYPE_MISMATCH", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}
