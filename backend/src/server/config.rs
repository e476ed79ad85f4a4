//! Server configuration read from the environment at startup.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use actix_web::cookie::Key;
use tracing::warn;

use crate::domain::SLOT_LOCK_TTL;

/// Errors raised while assembling the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("missing required environment variable: {name}")]
    Missing {
        /// Variable name.
        name: &'static str,
    },
    /// An environment variable holds an unusable value.
    #[error("invalid value for {name}: {message}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// What was wrong with it.
        message: String,
    },
    /// The session key file could not be read.
    #[error("failed to read session key at {path}: {message}")]
    SessionKey {
        /// Configured key path.
        path: String,
        /// Underlying I/O failure.
        message: String,
    },
}

/// Runtime configuration for the HTTP server and its adapters.
pub struct AppConfig {
    /// Socket address the server binds to.
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis URL for the slot lock store; absent means the in-process
    /// store, which only covers a single instance.
    pub redis_url: Option<String>,
    /// Session cookie signing/encryption key.
    pub session_key: Key,
    /// Whether the session cookie requires HTTPS.
    pub cookie_secure: bool,
    /// TTL for slot locks.
    pub lock_ttl: Duration,
}

impl AppConfig {
    /// Assemble the configuration from environment variables.
    ///
    /// Reads `BIND_ADDR`, `DATABASE_URL`, `REDIS_URL`, `SESSION_KEY_FILE`
    /// (with `SESSION_ALLOW_EPHEMERAL=1` as the dev fallback),
    /// `SESSION_COOKIE_SECURE`, and `SLOT_LOCK_TTL_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_owned())
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::Invalid {
                name: "BIND_ADDR",
                message: err.to_string(),
            })?;

        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing {
            name: "DATABASE_URL",
        })?;
        let redis_url = env::var("REDIS_URL").ok();

        let session_key = load_session_key()?;
        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .map(|v| v != "0")
            .unwrap_or(true);

        let lock_ttl = match env::var("SLOT_LOCK_TTL_SECS") {
            Ok(raw) => {
                let secs = raw.parse::<u64>().map_err(|err| ConfigError::Invalid {
                    name: "SLOT_LOCK_TTL_SECS",
                    message: err.to_string(),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        name: "SLOT_LOCK_TTL_SECS",
                        message: "lock TTL must be positive".to_owned(),
                    });
                }
                Duration::from_secs(secs)
            }
            Err(_) => SLOT_LOCK_TTL,
        };

        Ok(Self {
            bind_addr,
            database_url,
            redis_url,
            session_key,
            cookie_secure,
            lock_ttl,
        })
    }
}

fn load_session_key() -> Result<Key, ConfigError> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".to_owned());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(err) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %err, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(ConfigError::SessionKey {
                    path: key_path,
                    message: err.to_string(),
                })
            }
        }
    }
}
