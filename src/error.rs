//! Error types for keysession.

use thiserror::Error;

/// Main error type for keysession operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The engine was shut down and can no longer be initialised.
    #[error("session engine has been closed")]
    EngineClosed,

    /// The engine's own initialisation failed.
    #[error("session engine failed to initialise: {0}")]
    EngineInit(String),

    /// The engine was used before initialisation or after closing.
    #[error("session engine is not initialised")]
    EngineUnavailable,

    /// A key was written to a session the engine does not hold.
    #[error("session not found")]
    UnknownSession,

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// A stored value did not have the type the caller asked for.
    #[error("session key '{key}' holds {found}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A Set-Cookie header could not be built from the session cookie.
    #[error("invalid session cookie: {0}")]
    InvalidCookie(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for keysession operations.
pub type Result<T> = std::result::Result<T, SessionError>;
