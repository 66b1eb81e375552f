//! In-process storage engine.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

use super::{EngineState, SessionEngine, SessionId, SessionValue};
use crate::error::SessionError;
use crate::Result;

type Keys = HashMap<String, SessionValue>;
type Sessions = HashMap<SessionId, Keys>;

/// Storage engine keeping every session in a process-local map.
///
/// Nothing is saved; all sessions are lost on [`close`](SessionEngine::close).
/// A single lock covers the whole store, so any two operations on the engine
/// are serialised. The map only exists between `init` and `close`: outside
/// that window lookups report nothing and mutations fail with
/// [`SessionError::EngineUnavailable`]. Writing a key into a session that
/// does not exist fails with [`SessionError::UnknownSession`].
#[derive(Debug, Default)]
pub struct MemoryEngine {
    sessions: RwLock<Option<Sessions>>,
    state: EngineState,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> Result<usize> {
        Ok(self.read()?.as_ref().map_or(0, HashMap::len))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Option<Sessions>>> {
        self.sessions.read().map_err(|_| SessionError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Option<Sessions>>> {
        self.sessions.write().map_err(|_| SessionError::LockPoisoned)
    }
}

impl SessionEngine for MemoryEngine {
    fn init(&self) -> Result<()> {
        *self.write()? = Some(HashMap::new());
        Ok(())
    }

    fn state(&self) -> &EngineState {
        &self.state
    }

    fn close(&self) {
        match self.sessions.write() {
            Ok(mut sessions) => *sessions = None,
            Err(_) => warn!("session store lock poisoned, sessions not released on close"),
        }
    }

    fn session_exists(&self, id: &SessionId) -> Result<bool> {
        Ok(self
            .read()?
            .as_ref()
            .is_some_and(|sessions| sessions.contains_key(id)))
    }

    fn create_session(&self, id: &SessionId) -> Result<()> {
        let mut guard = self.write()?;
        let sessions = guard.as_mut().ok_or(SessionError::EngineUnavailable)?;
        sessions.insert(id.clone(), Keys::new());
        Ok(())
    }

    fn destroy_session(&self, id: &SessionId) -> Result<()> {
        if let Some(sessions) = self.write()?.as_mut() {
            sessions.remove(id);
        }
        Ok(())
    }

    fn destroy_all_sessions(&self) -> Result<()> {
        let mut guard = self.write()?;
        let sessions = guard.as_mut().ok_or(SessionError::EngineUnavailable)?;
        sessions.clear();
        Ok(())
    }

    fn read_key(&self, id: &SessionId, key: &str) -> Result<Option<SessionValue>> {
        Ok(self
            .read()?
            .as_ref()
            .and_then(|sessions| sessions.get(id))
            .and_then(|keys| keys.get(key))
            .cloned())
    }

    fn write_key(&self, id: &SessionId, key: &str, value: SessionValue) -> Result<()> {
        let mut guard = self.write()?;
        let sessions = guard.as_mut().ok_or(SessionError::EngineUnavailable)?;
        let keys = sessions.get_mut(id).ok_or(SessionError::UnknownSession)?;
        keys.insert(key.to_string(), value);
        Ok(())
    }

    fn delete_key(&self, id: &SessionId, key: &str) -> Result<()> {
        if let Some(keys) = self.write()?.as_mut().and_then(|s| s.get_mut(id)) {
            keys.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_engine() -> MemoryEngine {
        let engine = MemoryEngine::new();
        engine.init().unwrap();
        engine
    }

    fn id(s: &str) -> SessionId {
        SessionId::from_raw(s)
    }

    #[test]
    fn test_create_and_exists() {
        let engine = ready_engine();
        assert!(!engine.session_exists(&id("a")).unwrap());

        engine.create_session(&id("a")).unwrap();
        assert!(engine.session_exists(&id("a")).unwrap());
        assert_eq!(engine.session_count().unwrap(), 1);
    }

    #[test]
    fn test_create_overwrites_existing() {
        let engine = ready_engine();
        engine.create_session(&id("a")).unwrap();
        engine.write_key(&id("a"), "k", "v".into()).unwrap();

        engine.create_session(&id("a")).unwrap();
        assert_eq!(engine.read_key(&id("a"), "k").unwrap(), None);
    }

    #[test]
    fn test_write_read_delete() {
        let engine = ready_engine();
        engine.create_session(&id("a")).unwrap();

        engine.write_key(&id("a"), "count", 1i64.into()).unwrap();
        engine.write_key(&id("a"), "count", 2i64.into()).unwrap();
        assert_eq!(
            engine.read_key(&id("a"), "count").unwrap(),
            Some(SessionValue::Integer(2))
        );

        engine.delete_key(&id("a"), "count").unwrap();
        assert_eq!(engine.read_key(&id("a"), "count").unwrap(), None);

        // Deleting again is a no-op
        engine.delete_key(&id("a"), "count").unwrap();
    }

    #[test]
    fn test_sessions_are_isolated() {
        let engine = ready_engine();
        engine.create_session(&id("a")).unwrap();
        engine.create_session(&id("b")).unwrap();

        engine.write_key(&id("a"), "k", "from-a".into()).unwrap();
        assert_eq!(engine.read_key(&id("b"), "k").unwrap(), None);
    }

    #[test]
    fn test_read_unknown_session_is_absent() {
        let engine = ready_engine();
        assert_eq!(engine.read_key(&id("ghost"), "k").unwrap(), None);
    }

    #[test]
    fn test_write_unknown_session_fails() {
        let engine = ready_engine();
        assert!(matches!(
            engine.write_key(&id("ghost"), "k", true.into()),
            Err(SessionError::UnknownSession)
        ));
        assert!(!engine.session_exists(&id("ghost")).unwrap());
    }

    #[test]
    fn test_write_after_destroy_fails() {
        let engine = ready_engine();
        engine.create_session(&id("a")).unwrap();
        engine.destroy_session(&id("a")).unwrap();

        assert!(matches!(
            engine.write_key(&id("a"), "k", "v".into()),
            Err(SessionError::UnknownSession)
        ));
        assert_eq!(engine.read_key(&id("a"), "k").unwrap(), None);
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        use std::sync::Arc;
        use std::thread;

        let engine = Arc::new(ready_engine());
        let poisoner = Arc::clone(&engine);
        let _ = thread::spawn(move || {
            let _guard = poisoner.sessions.write().unwrap();
            panic!("poison the store lock");
        })
        .join();

        assert!(matches!(
            engine.session_count(),
            Err(SessionError::LockPoisoned)
        ));
        assert!(matches!(
            engine.session_exists(&id("a")),
            Err(SessionError::LockPoisoned)
        ));
        // Closing a poisoned store logs instead of panicking
        engine.close();
    }

    #[test]
    fn test_destroy_session() {
        let engine = ready_engine();
        engine.create_session(&id("a")).unwrap();
        engine.destroy_session(&id("a")).unwrap();
        assert!(!engine.session_exists(&id("a")).unwrap());

        // Unknown IDs are ignored
        engine.destroy_session(&id("a")).unwrap();
    }

    #[test]
    fn test_destroy_all_sessions() {
        let engine = ready_engine();
        for name in ["a", "b", "c"] {
            engine.create_session(&id(name)).unwrap();
        }
        engine.destroy_all_sessions().unwrap();
        assert_eq!(engine.session_count().unwrap(), 0);
    }

    #[test]
    fn test_uninitialised_engine() {
        let engine = MemoryEngine::new();
        assert!(!engine.session_exists(&id("a")).unwrap());
        assert_eq!(engine.read_key(&id("a"), "k").unwrap(), None);
        assert!(matches!(
            engine.create_session(&id("a")),
            Err(SessionError::EngineUnavailable)
        ));
        assert!(matches!(
            engine.write_key(&id("a"), "k", 1i64.into()),
            Err(SessionError::EngineUnavailable)
        ));
    }

    #[test]
    fn test_close_drops_sessions() {
        let engine = ready_engine();
        engine.create_session(&id("a")).unwrap();
        engine.close();

        assert_eq!(engine.session_count().unwrap(), 0);
        assert!(!engine.session_exists(&id("a")).unwrap());
        assert!(matches!(
            engine.create_session(&id("b")),
            Err(SessionError::EngineUnavailable)
        ));
    }

    #[test]
    fn test_concurrent_writes() {
        use std::sync::Arc;
        use std::thread;

        let engine = Arc::new(ready_engine());
        engine.create_session(&id("shared")).unwrap();

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    engine
                        .write_key(&id("shared"), &format!("k{i}"), SessionValue::Integer(i))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0..50 {
            assert_eq!(
                engine.read_key(&id("shared"), &format!("k{i}")).unwrap(),
                Some(SessionValue::Integer(i))
            );
        }
    }
}
