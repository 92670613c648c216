use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid PORT: {0}")]
    InvalidPort(String),

    #[error("Invalid HOST: {0}")]
    InvalidHost(String),

    #[error("Invalid LOG_FORMAT: {0} (expected `json` or `text`)")]
    InvalidLogFormat(String),

    #[error("Invalid DATABASE_URL: {0}")]
    InvalidDatabaseUrl(String),
}

/// Where todos are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local map, lost on exit.
    Memory,
    /// SQLite database living only in memory.
    SqliteMemory,
    /// SQLite database file.
    SqliteFile(PathBuf),
}

impl StorageBackend {
    /// Interprets a `DATABASE_URL` value.
    ///
    /// Accepts `memory`, `sqlite::memory:`, `sqlite://<path>`, `sqlite:<path>`
    /// or a bare filesystem path.
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        match url {
            "" => Err(ConfigError::InvalidDatabaseUrl(url.to_string())),
            "memory" => Ok(Self::Memory),
            "sqlite::memory:" | ":memory:" => Ok(Self::SqliteMemory),
            _ => {
                let path = url
                    .strip_prefix("sqlite://")
                    .or_else(|| url.strip_prefix("sqlite:"))
                    .unwrap_or(url);
                if path.is_empty() {
                    return Err(ConfigError::InvalidDatabaseUrl(url.to_string()));
                }
                Ok(Self::SqliteFile(PathBuf::from(path)))
            }
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::SqliteMemory => write!(f, "sqlite::memory:"),
            Self::SqliteFile(path) => write!(f, "sqlite://{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "pretty" => Ok(Self::Text),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub storage: StorageBackend,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
            storage: StorageBackend::Memory,
            log_format: LogFormat::Json,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = match lookup("HOST") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidHost(raw))?,
            None => defaults.host,
        };
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };
        let storage = match lookup("DATABASE_URL") {
            Some(raw) => StorageBackend::from_url(&raw)?,
            None => defaults.storage,
        };
        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => defaults.log_format,
        };

        Ok(Config {
            host,
            port,
            storage,
            log_format,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn reads_every_variable() {
        let config = config_from(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "8080"),
            ("DATABASE_URL", "sqlite://todo.db"),
            ("LOG_FORMAT", "text"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.storage, StorageBackend::SqliteFile("todo.db".into()));
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            config_from(&[("PORT", "eighty")]).unwrap_err(),
            ConfigError::InvalidPort("eighty".into())
        );
        assert!(matches!(
            config_from(&[("HOST", "not-an-ip")]),
            Err(ConfigError::InvalidHost(_))
        ));
        assert!(matches!(
            config_from(&[("LOG_FORMAT", "xml")]),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }

    #[test]
    fn database_url_forms() {
        assert_eq!(
            StorageBackend::from_url("sqlite::memory:").unwrap(),
            StorageBackend::SqliteMemory
        );
        assert_eq!(
            StorageBackend::from_url("sqlite:data/todo.db").unwrap(),
            StorageBackend::SqliteFile("data/todo.db".into())
        );
        assert_eq!(
            StorageBackend::from_url("/var/lib/todo.db").unwrap(),
            StorageBackend::SqliteFile("/var/lib/todo.db".into())
        );
        assert!(StorageBackend::from_url("sqlite://").is_err());
        assert!(StorageBackend::from_url("  ").is_err());
    }
}
