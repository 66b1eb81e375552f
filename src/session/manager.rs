//! Resolving requests to sessions.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use tracing::{debug, info};

use super::cookie::{add_session_cookie, find_session_cookie};
use super::id::DEFAULT_ID_LENGTH;
use super::{ensure_initialized, shutdown, IdGenerator, Session, SessionEngine, SessionId};
use crate::Result;

/// Default name of the session cookie.
pub const DEFAULT_COOKIE_NAME: &str = "GosessionCookie";

/// Roughly ten calendar years.
const DEFAULT_COOKIE_LIFETIME: Duration = Duration::from_secs(3652 * 24 * 60 * 60);

/// Settings shared by the resolver and the ID generator.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name of the cookie read from requests and sent to browsers.
    pub cookie_name: String,
    /// Length of generated IDs; cookies of any other length are ignored.
    pub id_length: usize,
    /// `Path` attribute of the session cookie.
    pub cookie_path: String,
    /// How far in the future the cookie expires.
    pub cookie_lifetime: Duration,
    /// Send a fresh cookie when a request's ID no longer names a session.
    pub reissue_stale_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            id_length: DEFAULT_ID_LENGTH,
            cookie_path: "/".to_string(),
            cookie_lifetime: DEFAULT_COOKIE_LIFETIME,
            reissue_stale_cookie: false,
        }
    }
}

impl SessionConfig {
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_id_length(mut self, length: usize) -> Self {
        self.id_length = length;
        self
    }

    pub fn with_cookie_lifetime(mut self, lifetime: Duration) -> Self {
        self.cookie_lifetime = lifetime;
        self
    }

    pub fn with_reissue_stale_cookie(mut self, reissue: bool) -> Self {
        self.reissue_stale_cookie = reissue;
        self
    }
}

/// Entry point tying a configuration to one storage engine.
#[derive(Clone)]
pub struct SessionManager {
    config: SessionConfig,
    engine: Arc<dyn SessionEngine>,
    generator: IdGenerator,
}

impl SessionManager {
    pub fn new(config: SessionConfig, engine: Arc<dyn SessionEngine>) -> Self {
        let generator = IdGenerator::new(config.id_length);
        Self {
            config,
            engine,
            generator,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<dyn SessionEngine> {
        &self.engine
    }

    pub fn ensure_initialized(&self) -> Result<()> {
        ensure_initialized(self.engine.as_ref())
    }

    /// Find or start the session for a request.
    ///
    /// A request carrying a well-formed session cookie is loaded through
    /// [`load_or_create`](Self::load_or_create). Otherwise a new session is
    /// created and its cookie appended to `response_headers`.
    pub fn resolve_from_request(
        &self,
        request_headers: &HeaderMap,
        response_headers: &mut HeaderMap,
    ) -> Result<Session> {
        let cookie = find_session_cookie(
            request_headers,
            &self.config.cookie_name,
            self.config.id_length,
        );

        if let Some(id) = cookie {
            let session = self.load_or_create(id.clone())?;
            if self.config.reissue_stale_cookie && session.id() != &id {
                add_session_cookie(response_headers, &self.config, session.id())?;
            }
            return Ok(session);
        }

        self.ensure_initialized()?;
        let (session, id) = self.create_new_session()?;
        add_session_cookie(response_headers, &self.config, &id)?;
        Ok(session)
    }

    /// Bind to `id` if it names a live session, otherwise start a new one.
    ///
    /// The returned session's ID can differ from `id`.
    pub fn load_or_create(&self, id: SessionId) -> Result<Session> {
        self.ensure_initialized()?;

        if self.engine.session_exists(&id)? {
            return Ok(Session::new(id, Arc::clone(&self.engine)));
        }

        debug!("requested session is unknown, replacing it");
        let (session, _) = self.create_new_session()?;
        Ok(session)
    }

    /// Generate an unused ID and create an empty session under it.
    pub fn create_new_session(&self) -> Result<(Session, SessionId)> {
        let id = self.generator.generate_unique(self.engine.as_ref())?;
        self.engine.create_session(&id)?;
        debug!("session created");
        Ok((Session::new(id.clone(), Arc::clone(&self.engine)), id))
    }

    pub fn destroy_all_sessions(&self) -> Result<()> {
        self.engine.destroy_all_sessions()?;
        info!("all sessions destroyed");
        Ok(())
    }

    /// Close the engine; every later resolution fails with
    /// [`EngineClosed`](crate::SessionError::EngineClosed).
    pub fn close_engine(&self) {
        shutdown(self.engine.as_ref());
    }
}
