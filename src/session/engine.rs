//! Storage engine contract.

use super::{EngineState, SessionId, SessionValue};
use crate::Result;

/// Backend that persists sessions and their keys.
///
/// Every call is synchronous. Engines shared between requests must guard
/// their own maps; the layer above adds no locking. Reading an unknown key
/// or session yields `Ok(None)`, never an error.
pub trait SessionEngine: Send + Sync {
    /// Prepare whatever the engine needs to manage sessions.
    ///
    /// Called at most once, through [`ensure_initialized`](super::ensure_initialized).
    fn init(&self) -> Result<()>;

    /// Lifecycle flags shared with the lifecycle manager.
    fn state(&self) -> &EngineState;

    /// Save and release resources. Called at most once, by
    /// [`shutdown`](super::shutdown).
    fn close(&self);

    /// Whether `id` names a live session.
    fn session_exists(&self, id: &SessionId) -> Result<bool>;

    /// Create an empty session. An existing session under `id` may be replaced.
    fn create_session(&self, id: &SessionId) -> Result<()>;

    /// Remove a session and its keys. Unknown IDs are ignored.
    fn destroy_session(&self, id: &SessionId) -> Result<()>;

    /// Remove every session.
    fn destroy_all_sessions(&self) -> Result<()>;

    fn read_key(&self, id: &SessionId, key: &str) -> Result<Option<SessionValue>>;

    /// Insert or overwrite `key`.
    fn write_key(&self, id: &SessionId, key: &str, value: SessionValue) -> Result<()>;

    /// Remove `key`. Unknown keys are ignored.
    fn delete_key(&self, id: &SessionId, key: &str) -> Result<()>;
}
