//! Session management module.
//!
//! This module provides the storage engine contract, the in-memory engine,
//! engine lifecycle handling, session identifiers, the session cookie and
//! the resolver that turns a request into a [`Session`].

pub mod cookie;
mod engine;
mod handle;
mod id;
mod manager;
mod memory;
mod state;
mod value;

pub use engine::SessionEngine;
pub use handle::Session;
pub use id::{IdGenerator, SessionId, DEFAULT_ID_LENGTH};
pub use manager::{SessionConfig, SessionManager, DEFAULT_COOKIE_NAME};
pub use memory::MemoryEngine;
pub use state::{ensure_initialized, shutdown, EngineState};
pub use value::SessionValue;
