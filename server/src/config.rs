//! Runtime configuration read from the environment.
//!
//! # Environment Variables
//!
//! - `HOST`: IPv4 or IPv6 bind address (default: `127.0.0.1`)
//! - `PORT`: bind port (default: `8000`)
//! - `STORAGE_MODE`: `memory` (default) | `sqlite`
//! - `DATABASE_URL`: SQLite URL, required when `STORAGE_MODE=sqlite`
//!
//! The binary loads a `.env` file with `dotenvy` before calling
//! `ServerConfig::from_env`.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const DEFAULT_PORT: u16 = 8000;

/// Which `TodoStore` implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-lifetime store; contents vanish on restart.
    #[default]
    Memory,
    /// Relational store backed by a SQLite table.
    Sqlite,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "memory" | "in_memory" | "inmemory" => Ok(Self::Memory),
            "sqlite" | "database" | "relational" => Ok(Self::Sqlite),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreConfig {
    pub storage_mode: StorageMode,
    /// Required when `storage_mode` is `Sqlite`.
    pub database_url: Option<String>,
}

impl StoreConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn sqlite(url: impl Into<String>) -> Self {
        Self {
            storage_mode: StorageMode::Sqlite,
            database_url: Some(url.into()),
        }
    }

    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingDatabaseUrl` when SQLite storage is
    /// selected without a URL.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.storage_mode == StorageMode::Sqlite && self.database_url.is_none() {
            return Err(ConfigurationError::MissingDatabaseUrl);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup. Empty or
    /// whitespace-only values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if `STORAGE_MODE`, `HOST` or `PORT` cannot
    /// be parsed, or if `DATABASE_URL` is missing for SQLite storage.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let storage_mode = match read("STORAGE_MODE") {
            Some(value) => value.parse()?,
            None => StorageMode::default(),
        };

        let host = match read("HOST") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigurationError::InvalidHost(value))?,
            None => DEFAULT_HOST,
        };

        let port = match read("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigurationError::InvalidPort(value))?,
            None => DEFAULT_PORT,
        };

        let config = Self {
            host,
            port,
            store: StoreConfig {
                storage_mode,
                database_url: read("DATABASE_URL"),
            },
        };

        config.store.validate()?;
        Ok(config)
    }

    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Invalid storage mode: '{0}'. Expected 'memory' or 'sqlite'")]
    InvalidStorageMode(String),

    #[error("Invalid host: '{0}'. Expected an IP address")]
    InvalidHost(String),

    #[error("Invalid port: '{0}'")]
    InvalidPort(String),

    #[error("DATABASE_URL environment variable is required when STORAGE_MODE=sqlite")]
    MissingDatabaseUrl,
}
