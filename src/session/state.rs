//! Engine lifecycle: one initialisation attempt, permanent close.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use super::SessionEngine;
use crate::error::SessionError;
use crate::Result;

/// Lifecycle flags of one engine instance.
///
/// Owned by the engine and exposed through [`SessionEngine::state`] so the
/// lifecycle functions can read and flip them.
#[derive(Debug, Default)]
pub struct EngineState {
    initialised: AtomicBool,
    closed: AtomicBool,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Set `initialised`, returning `true` only for the caller that flipped it.
    pub fn try_mark_initialised(&self) -> bool {
        !self.initialised.swap(true, Ordering::AcqRel)
    }

    pub fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// Initialise `engine` unless that was already attempted.
///
/// The flag is raised before [`SessionEngine::init`] runs, so an engine whose
/// init failed stays marked initialised and is not retried. A caller racing
/// the first one sees the flag already set and returns `Ok` while that init
/// may still be running; initialise the engine once at startup when requests
/// can arrive concurrently.
pub fn ensure_initialized(engine: &dyn SessionEngine) -> Result<()> {
    let state = engine.state();
    if state.is_closed() {
        return Err(SessionError::EngineClosed);
    }
    if !state.try_mark_initialised() {
        return Ok(());
    }

    debug!("initialising session engine");
    if let Err(e) = engine.init() {
        warn!("session engine init failed: {}", e);
        return Err(e);
    }
    info!("session engine initialised");
    Ok(())
}

/// Close `engine` and refuse any later initialisation.
pub fn shutdown(engine: &dyn SessionEngine) {
    engine.close();
    engine.state().mark_closed();
    info!("session engine closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionId, SessionValue};
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc::{Receiver, Sender};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingEngine {
        state: EngineState,
        fail_init: bool,
        inits: AtomicUsize,
        closes: AtomicUsize,
        // Set by tests holding init open: signal entry, then wait for release
        entered: Option<Mutex<Sender<()>>>,
        release: Option<Mutex<Receiver<()>>>,
        init_done: AtomicBool,
    }

    impl SessionEngine for CountingEngine {
        fn init(&self) -> Result<()> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            if let (Some(entered), Some(release)) = (&self.entered, &self.release) {
                let _ = entered.lock().unwrap().send(());
                let _ = release.lock().unwrap().recv();
            }
            self.init_done.store(true, Ordering::SeqCst);
            if self.fail_init {
                Err(SessionError::EngineInit("backing store unreachable".into()))
            } else {
                Ok(())
            }
        }
        fn state(&self) -> &EngineState {
            &self.state
        }
        fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
        fn session_exists(&self, _id: &SessionId) -> Result<bool> {
            Ok(false)
        }
        fn create_session(&self, _id: &SessionId) -> Result<()> {
            Ok(())
        }
        fn destroy_session(&self, _id: &SessionId) -> Result<()> {
            Ok(())
        }
        fn destroy_all_sessions(&self) -> Result<()> {
            Ok(())
        }
        fn read_key(&self, _id: &SessionId, _key: &str) -> Result<Option<SessionValue>> {
            Ok(None)
        }
        fn write_key(&self, _id: &SessionId, _key: &str, _value: SessionValue) -> Result<()> {
            Ok(())
        }
        fn delete_key(&self, _id: &SessionId, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_state_default() {
        let state = EngineState::new();
        assert!(!state.is_initialised());
        assert!(!state.is_closed());
    }

    #[test]
    fn test_try_mark_initialised_once() {
        let state = EngineState::new();
        assert!(state.try_mark_initialised());
        assert!(!state.try_mark_initialised());
        assert!(state.is_initialised());
    }

    #[test]
    fn test_ensure_initialized_is_idempotent() {
        let engine = CountingEngine::default();
        ensure_initialized(&engine).unwrap();
        ensure_initialized(&engine).unwrap();

        assert_eq!(engine.inits.load(Ordering::SeqCst), 1);
        assert!(engine.state.is_initialised());
    }

    #[test]
    fn test_failed_init_is_not_retried() {
        let engine = CountingEngine {
            fail_init: true,
            ..Default::default()
        };

        let err = ensure_initialized(&engine).unwrap_err();
        assert!(matches!(err, SessionError::EngineInit(_)));
        assert!(engine.state.is_initialised());

        // Second call sees the flag and returns without calling init again
        assert!(ensure_initialized(&engine).is_ok());
        assert_eq!(engine.inits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_closed_engine_refuses_init() {
        let engine = CountingEngine::default();
        shutdown(&engine);

        for _ in 0..3 {
            assert!(matches!(
                ensure_initialized(&engine),
                Err(SessionError::EngineClosed)
            ));
        }
        assert_eq!(engine.inits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_closed_after_init_refuses_init() {
        let engine = CountingEngine::default();
        ensure_initialized(&engine).unwrap();
        shutdown(&engine);

        assert!(matches!(
            ensure_initialized(&engine),
            Err(SessionError::EngineClosed)
        ));
        assert_eq!(engine.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shutdown_always_calls_close() {
        let engine = CountingEngine::default();
        shutdown(&engine);
        shutdown(&engine);
        assert_eq!(engine.closes.load(Ordering::SeqCst), 2);
        assert!(engine.state.is_closed());
    }

    #[test]
    fn test_concurrent_ensure_initialized_inits_once() {
        use std::sync::Arc;
        use std::thread;

        let engine = Arc::new(CountingEngine::default());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || ensure_initialized(engine.as_ref()).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(engine.inits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_racing_caller_returns_before_init_finishes() {
        use std::sync::{mpsc, Arc};
        use std::thread;

        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let engine = Arc::new(CountingEngine {
            entered: Some(Mutex::new(entered_tx)),
            release: Some(Mutex::new(release_rx)),
            ..Default::default()
        });

        let first = {
            let engine = Arc::clone(&engine);
            thread::spawn(move || ensure_initialized(engine.as_ref()))
        };
        entered_rx.recv().unwrap();

        // The flag is already raised, so the second caller does not wait
        assert!(ensure_initialized(engine.as_ref()).is_ok());
        assert!(!engine.init_done.load(Ordering::SeqCst));

        release_tx.send(()).unwrap();
        first.join().unwrap().unwrap();
        assert!(engine.init_done.load(Ordering::SeqCst));
        assert_eq!(engine.inits.load(Ordering::SeqCst), 1);
    }
}
