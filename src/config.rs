use crate::context::OpContext;
use crate::error::{StoreError, StoreResult};
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://notes.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_OP_TIMEOUT_MS: u64 = 5_000;

/// Connection and call settings for a [`SqliteNoteStore`](crate::store::sqlite::SqliteNoteStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// Default deadline for a single store call. `None` waits indefinitely.
    pub operation_timeout: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            operation_timeout: Some(Duration::from_millis(DEFAULT_OP_TIMEOUT_MS)),
        }
    }
}

impl StoreConfig {
    /// Loads `.env` from the working directory if present, then reads the
    /// process environment.
    ///
    /// Recognised variables: `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS`,
    /// `NOTE_OP_TIMEOUT_MS` (`0` disables the timeout).
    pub fn from_env() -> StoreResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to defaults
    /// for missing keys.
    ///
    /// # Errors
    /// [`StoreError::Config`] when a value is present but malformed.
    pub fn from_lookup<F>(lookup: F) -> StoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = match lookup("DATABASE_URL") {
            Some(url) if url.trim().is_empty() => {
                return Err(StoreError::Config("DATABASE_URL is empty".into()));
            }
            Some(url) => url.trim().to_owned(),
            None => defaults.database_url,
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(0) | Err(_) => {
                    return Err(StoreError::Config(format!(
                        "DATABASE_MAX_CONNECTIONS must be a positive integer, got {raw:?}"
                    )));
                }
                Ok(n) => n,
            },
            None => defaults.max_connections,
        };

        let operation_timeout = match lookup("NOTE_OP_TIMEOUT_MS") {
            Some(raw) => {
                let ms = raw.trim().parse::<u64>().map_err(|_| {
                    StoreError::Config(format!(
                        "NOTE_OP_TIMEOUT_MS must be milliseconds, got {raw:?}"
                    ))
                })?;
                (ms > 0).then(|| Duration::from_millis(ms))
            }
            None => defaults.operation_timeout,
        };

        Ok(Self {
            database_url,
            max_connections,
            operation_timeout,
        })
    }

    /// A fresh [`OpContext`] carrying the configured timeout.
    pub fn op_context(&self) -> OpContext {
        match self.operation_timeout {
            Some(limit) => OpContext::background().with_timeout(limit),
            None => OpContext::background(),
        }
    }
}
