//! Handle bound to one session.

use std::fmt;
use std::sync::Arc;

use super::{SessionEngine, SessionId, SessionValue};
use crate::error::SessionError;
use crate::Result;

/// A session as seen by request code.
///
/// Holds only the ID and the engine; every call goes straight to the engine.
#[derive(Clone)]
pub struct Session {
    id: SessionId,
    engine: Arc<dyn SessionEngine>,
}

impl Session {
    pub fn new(id: SessionId, engine: Arc<dyn SessionEngine>) -> Self {
        Self { id, engine }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Remove this session and all its keys from the engine.
    pub fn destroy(&self) -> Result<()> {
        self.engine.destroy_session(&self.id)
    }

    /// Drop every key while keeping the same ID.
    ///
    /// Implemented as destroy then create; another request may briefly see
    /// the session missing.
    pub fn clear(&self) -> Result<()> {
        self.destroy()?;
        self.engine.create_session(&self.id)
    }

    pub fn read(&self, key: &str) -> Result<Option<SessionValue>> {
        self.engine.read_key(&self.id, key)
    }

    /// Read `key`, falling back to `default` when it is absent.
    pub fn read_or(&self, key: &str, default: impl Into<SessionValue>) -> Result<SessionValue> {
        Ok(self.read(key)?.unwrap_or_else(|| default.into()))
    }

    /// Read `key` as a string. Absent keys read as `""`.
    pub fn read_string(&self, key: &str) -> Result<String> {
        match self.read_or(key, "")? {
            SessionValue::String(s) => Ok(s),
            other => Err(SessionError::TypeMismatch {
                key: key.to_string(),
                expected: "string",
                found: other.kind(),
            }),
        }
    }

    pub fn write(&self, key: &str, value: impl Into<SessionValue>) -> Result<()> {
        self.engine.write_key(&self.id, key, value.into())
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        self.engine.delete_key(&self.id, key)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish_non_exhaustive()
    }
}
