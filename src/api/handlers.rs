//! REST API handlers.
//!
//! Every handler resolves the caller's session from its cookies and returns
//! whatever `Set-Cookie` headers the resolution produced.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use super::types::{ErrorResponse, KeyValueResponse, SessionInfoResponse, VisitsResponse};
use crate::error::SessionError;
use crate::session::{MemoryEngine, Session, SessionConfig, SessionManager, SessionValue};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Key used by the visit counter endpoint.
const VISITS_KEY: &str = "visits";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    /// State backed by a fresh [`MemoryEngine`] with default settings.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let engine = Arc::new(MemoryEngine::new());
        Self::with_manager(SessionManager::new(config, engine))
    }

    pub fn with_manager(manager: SessionManager) -> Self {
        Self {
            sessions: Arc::new(manager),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn api_error(err: SessionError) -> ApiError {
    match err {
        SessionError::EngineClosed => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::engine_closed()),
        ),
        SessionError::UnknownSession => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::session_not_found()),
        ),
        SessionError::TypeMismatch { .. } => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::type_mismatch(err.to_string())),
        ),
        other => {
            tracing::error!("session operation failed: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error(other.to_string())),
            )
        }
    }
}

fn resolve(state: &AppState, headers: &HeaderMap) -> Result<(Session, HeaderMap), ApiError> {
    let mut response_headers = HeaderMap::new();
    let session = state
        .sessions
        .resolve_from_request(headers, &mut response_headers)
        .map_err(api_error)?;
    Ok((session, response_headers))
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// API information endpoint.
pub async fn api_info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.sessions.config();
    Json(serde_json::json!({
        "name": "keysession",
        "version": env!("CARGO_PKG_VERSION"),
        "cookie_name": config.cookie_name,
        "id_length": config.id_length,
    }))
}

/// Describe (and if needed, start) the caller's session.
pub async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(HeaderMap, Json<SessionInfoResponse>), ApiError> {
    let (session, set_cookie) = resolve(&state, &headers)?;
    Ok((set_cookie, Json(SessionInfoResponse::new(session.id()))))
}

/// Destroy the caller's session.
pub async fn destroy_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, HeaderMap), ApiError> {
    let (session, set_cookie) = resolve(&state, &headers)?;
    session.destroy().map_err(api_error)?;
    Ok((StatusCode::NO_CONTENT, set_cookie))
}

/// Drop every key of the caller's session.
pub async fn clear_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(StatusCode, HeaderMap), ApiError> {
    let (session, set_cookie) = resolve(&state, &headers)?;
    session.clear().map_err(api_error)?;
    Ok((StatusCode::NO_CONTENT, set_cookie))
}

/// Increment and return the per-session visit counter.
pub async fn count_visit(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<(HeaderMap, Json<VisitsResponse>), ApiError> {
    let (session, set_cookie) = resolve(&state, &headers)?;

    let current = session.read_or(VISITS_KEY, 0i64).map_err(api_error)?;
    let visits = current.as_i64().ok_or_else(|| {
        api_error(SessionError::TypeMismatch {
            key: VISITS_KEY.to_string(),
            expected: "integer",
            found: current.kind(),
        })
    })? + 1;
    session.write(VISITS_KEY, visits).map_err(api_error)?;

    Ok((
        set_cookie,
        Json(VisitsResponse {
            session_id: session.id().to_string(),
            visits,
        }),
    ))
}

/// Read one key.
pub async fn read_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<(HeaderMap, Json<KeyValueResponse>), ApiError> {
    let (session, set_cookie) = resolve(&state, &headers)?;
    let value = session
        .read(&key)
        .map_err(api_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, Json(ErrorResponse::key_not_found(&key))))?;
    Ok((set_cookie, Json(KeyValueResponse::new(key, &value))))
}

/// Write one key from a JSON body.
pub async fn write_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, HeaderMap), ApiError> {
    let (session, set_cookie) = resolve(&state, &headers)?;
    session
        .write(&key, SessionValue::from_json(body))
        .map_err(api_error)?;
    Ok((StatusCode::NO_CONTENT, set_cookie))
}

/// Delete one key.
pub async fn delete_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<(StatusCode, HeaderMap), ApiError> {
    let (session, set_cookie) = resolve(&state, &headers)?;
    session.delete(&key).map_err(api_error)?;
    Ok((StatusCode::NO_CONTENT, set_cookie))
}
