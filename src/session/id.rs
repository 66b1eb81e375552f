//! Session identifier type and generator.

use std::fmt;

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::trace;

use super::SessionEngine;
use crate::Result;

/// Default number of characters in a generated session ID.
pub const DEFAULT_ID_LENGTH: usize = 64;

/// Opaque identifier tying a browser to one server-side session.
///
/// Generated IDs are drawn from `[A-Za-z0-9]`. IDs coming back from a
/// cookie are only checked for length, so they may contain anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a raw string without any shape checks.
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Accept a cookie value as an ID if it has exactly `expected_len` bytes.
    pub fn from_cookie_value(value: &str, expected_len: usize) -> Option<Self> {
        (value.len() == expected_len).then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Produces fixed-length random IDs that are unused in a given engine.
///
/// Randomness comes from the thread-local RNG and is not meant to make
/// IDs unguessable.
#[derive(Debug, Clone, Copy)]
pub struct IdGenerator {
    length: usize,
}

impl IdGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Draw one candidate, each character uniform over 62 symbols.
    pub fn generate_candidate(&self) -> SessionId {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect();
        SessionId(id)
    }

    /// Draw candidates until one is not a live session in `engine`.
    pub fn generate_unique(&self, engine: &dyn SessionEngine) -> Result<SessionId> {
        loop {
            let candidate = self.generate_candidate();
            if !engine.session_exists(&candidate)? {
                return Ok(candidate);
            }
            trace!("session id collision, drawing again");
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_LENGTH)
    }
}
