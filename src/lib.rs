//! # keysession
//!
//! Cookie-tracked server-side key/value sessions.
//!
//! A browser is handed a random session ID in a cookie; the ID addresses a
//! key/value map kept by a pluggable [`SessionEngine`]. The
//! [`SessionManager`] turns an incoming request into a [`Session`] handle,
//! creating the session and emitting the cookie when the request has none.
//!
//! ## Features
//!
//! - **Pluggable storage**: implement [`SessionEngine`] for any backend
//! - **Engine lifecycle**: one initialisation attempt, permanent close
//! - **Typed values**: keys hold a tagged [`SessionValue`]
//! - **In-memory engine**: [`MemoryEngine`] for tests and single processes
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use axum::http::HeaderMap;
//! use keysession::{MemoryEngine, SessionConfig, SessionManager};
//!
//! # fn main() -> keysession::Result<()> {
//! let manager = SessionManager::new(SessionConfig::default(), Arc::new(MemoryEngine::new()));
//!
//! let request_headers = HeaderMap::new();
//! let mut response_headers = HeaderMap::new();
//! let session = manager.resolve_from_request(&request_headers, &mut response_headers)?;
//!
//! session.write("user", "alice")?;
//! assert_eq!(session.read_string("user")?, "alice");
//! assert!(response_headers.contains_key("set-cookie"));
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;

// Re-export commonly used types
pub use error::{Result, SessionError};
pub use session::{
    EngineState, IdGenerator, MemoryEngine, Session, SessionConfig, SessionEngine, SessionId,
    SessionManager, SessionValue,
};
