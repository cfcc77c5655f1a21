//! Server configuration loaded from environment variables with defaults.
//!
//! | variable           | default     |
//! |--------------------|-------------|
//! | `HOST`             | `127.0.0.1` |
//! | `PORT`             | `3000`      |
//! | `TODO_STORE`       | `memory`    |
//! | `TODO_SQLITE_PATH` | `todos.db`  |

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),

    #[error("TODO_STORE must be `memory` or `sqlite`, got {0:?}")]
    UnknownStore(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Memory,
    Sqlite { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 3000,
        };
        let store = match lookup("TODO_STORE").as_deref() {
            None | Some("memory") => StoreConfig::Memory,
            Some("sqlite") => StoreConfig::Sqlite {
                path: lookup("TODO_SQLITE_PATH").unwrap_or_else(|| "todos.db".to_string()),
            },
            Some(other) => return Err(ConfigError::UnknownStore(other.to_string())),
        };
        Ok(Self { host, port, store })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
