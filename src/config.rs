//! Configuration management for the keysession demo server.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::ServerConfig;
use crate::cli::Args;
use crate::session::{SessionConfig, DEFAULT_COOKIE_NAME, DEFAULT_ID_LENGTH};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Longest accepted cookie lifetime, one century.
const MAX_COOKIE_LIFETIME_DAYS: u64 = 36_500;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerSection,
    /// Session cookie and identifier settings.
    pub session: SessionSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Close the session engine on Ctrl-C before exiting.
    pub graceful_shutdown: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            graceful_shutdown: true,
        }
    }
}

/// Session configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub cookie_name: String,
    pub id_length: usize,
    pub cookie_lifetime_days: u64,
    pub reissue_stale_cookie: bool,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            id_length: DEFAULT_ID_LENGTH,
            cookie_lifetime_days: 3652,
            reissue_stale_cookie: false,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("KEYSESSION_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("KEYSESSION_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Ok(name) = std::env::var("KEYSESSION_COOKIE_NAME") {
            if !name.is_empty() {
                self.session.cookie_name = name;
            }
        }

        if let Ok(level) = std::env::var("KEYSESSION_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = args.host {
            self.server.host = host.to_string();
        }

        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ref name) = args.cookie_name {
            self.session.cookie_name = name.clone();
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Convert to ServerConfig for the API server.
    pub fn to_server_config(&self) -> Result<ServerConfig, ConfigError> {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.server.host.clone()))?;

        let mut server_config = ServerConfig::new(host.to_string(), self.server.port);
        if !self.server.graceful_shutdown {
            server_config = server_config.without_graceful_shutdown();
        }
        Ok(server_config)
    }

    /// Convert to the SessionConfig used by the session manager.
    pub fn to_session_config(&self) -> Result<SessionConfig, ConfigError> {
        let section = &self.session;
        if section.cookie_name.is_empty() {
            return Err(ConfigError::InvalidSession("cookie_name must not be empty"));
        }
        if section.id_length == 0 {
            return Err(ConfigError::InvalidSession("id_length must be positive"));
        }
        if section.cookie_lifetime_days > MAX_COOKIE_LIFETIME_DAYS {
            return Err(ConfigError::InvalidSession(
                "cookie_lifetime_days must not exceed 36500",
            ));
        }

        Ok(SessionConfig::default()
            .with_cookie_name(section.cookie_name.clone())
            .with_id_length(section.id_length)
            .with_cookie_lifetime(Duration::from_secs(
                section.cookie_lifetime_days * SECS_PER_DAY,
            ))
            .with_reissue_stale_cookie(section.reissue_stale_cookie))
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Invalid host address.
    InvalidHost(String),
    /// Session settings that cannot produce working cookies.
    InvalidSession(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidHost(host) => write!(f, "invalid host address: {}", host),
            Self::InvalidSession(reason) => write!(f, "invalid session settings: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {}
