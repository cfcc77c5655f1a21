//! Proxy configuration loaded from environment variables with defaults.
//!
//! | variable       | default                 |
//! |----------------|-------------------------|
//! | `HOST`         | `127.0.0.1`             |
//! | `PORT`         | `8081`                  |
//! | `BACKEND_URL`  | `http://127.0.0.1:3000` |
//! | `BACKEND_TYPE` | `native`                |

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),

    #[error("BACKEND_TYPE must be `native`, `quarkus` or `spring`, got {0:?}")]
    UnknownBackend(String),
}

/// Which framework the backend runs on. Only decides where its readiness
/// endpoint lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    #[default]
    Native,
    Quarkus,
    Spring,
}

impl BackendKind {
    pub fn health_path(self) -> &'static str {
        match self {
            BackendKind::Native => "/health/ready",
            BackendKind::Quarkus => "/q/health/ready",
            BackendKind::Spring => "/actuator/health/readiness",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Native => "native",
            BackendKind::Quarkus => "quarkus",
            BackendKind::Spring => "spring",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(BackendKind::Native),
            "quarkus" => Ok(BackendKind::Quarkus),
            "spring" => Ok(BackendKind::Spring),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend_url: String,
    pub backend_kind: BackendKind,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 8081,
        };
        let backend_url =
            lookup("BACKEND_URL").unwrap_or_else(|| "http://127.0.0.1:3000".to_string());
        let backend_kind = match lookup("BACKEND_TYPE") {
            Some(raw) => raw.parse()?,
            None => BackendKind::default(),
        };
        Ok(Self {
            host,
            port,
            backend_url,
            backend_kind,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
