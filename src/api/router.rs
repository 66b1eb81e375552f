//! API router configuration.

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    api_info, clear_session, count_visit, delete_key, destroy_session, get_session, health,
    read_key, write_key, AppState,
};

/// Create the API router with a default in-memory session manager.
pub fn create_router() -> Router {
    create_router_with_state(AppState::new())
}

/// Create the API router with custom state.
pub fn create_router_with_state(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/", get(get_session).delete(destroy_session))
        .route("/clear", post(clear_session))
        .route("/visits", post(count_visit))
        .route(
            "/keys/{key}",
            get(read_key).put(write_key).delete(delete_key),
        );

    let api_v1 = Router::new()
        .route("/", get(api_info))
        .nest("/session", session_routes);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_v1)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Stop on Ctrl-C and close the session engine.
    pub graceful_shutdown: bool,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            graceful_shutdown: true,
        }
    }

    pub fn without_graceful_shutdown(mut self) -> Self {
        self.graceful_shutdown = false;
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", 3000)
    }
}

/// Start the API server with a default in-memory session manager.
pub async fn serve(config: ServerConfig) -> crate::Result<()> {
    serve_with_state(config, AppState::new()).await
}

/// Start the API server with custom state.
///
/// With graceful shutdown enabled the session engine is closed once Ctrl-C
/// stops the server.
pub async fn serve_with_state(config: ServerConfig, state: AppState) -> crate::Result<()> {
    let addr = config.bind_address();
    let sessions = state.sessions.clone();
    let router = create_router_with_state(state);

    sessions.ensure_initialized()?;
    tracing::info!("Starting keysession API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(crate::error::SessionError::Io)?;

    let server = axum::serve(listener, router);
    if config.graceful_shutdown {
        server
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(crate::error::SessionError::Io)?;
        sessions.close_engine();
    } else {
        server.await.map_err(crate::error::SessionError::Io)?;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
