//! API layer for keysession.
//!
//! A small REST surface showing sessions in use. Each request is bound to a
//! session through the session cookie; requests without one get a new
//! session and a `Set-Cookie` header.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/v1/` - API information
//! - `GET /api/v1/session` - Current session ID
//! - `DELETE /api/v1/session` - Destroy the session
//! - `POST /api/v1/session/clear` - Remove every key
//! - `POST /api/v1/session/visits` - Increment the visit counter
//! - `GET|PUT|DELETE /api/v1/session/keys/{key}` - Key access
//!
//! ## Example
//!
//! ```no_run
//! use keysession::api::{ServerConfig, serve};
//!
//! #[tokio::main]
//! async fn main() -> keysession::Result<()> {
//!     let config = ServerConfig::new("127.0.0.1", 3000);
//!     serve(config).await
//! }
//! ```

pub mod handlers;
pub mod router;
pub mod types;

pub use handlers::AppState;
pub use router::{create_router, create_router_with_state, serve, serve_with_state, ServerConfig};
pub use types::{ErrorResponse, KeyValueResponse, SessionInfoResponse, VisitsResponse};
