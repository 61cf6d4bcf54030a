//! Server configuration for IMDS.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Unparseable values fall back to their defaults.

use std::net::SocketAddr;
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Storage backend type.
    pub db_driver: DbDriver,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Deadline applied to every store call made on behalf of a request.
    pub request_timeout: Duration,
    /// Vendor whose document is served at `/vendor-data`.
    pub default_vendor: String,
}

/// Supported storage backend types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbDriver {
    /// In-memory (development only, data lost on restart).
    Memory,
    /// `SQLite` database file, created if missing.
    Sqlite { path: String },
    /// `PostgreSQL` connection string.
    Postgres { url: String },
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `IMDS_BIND_ADDR`: full bind address (overrides `PORT`)
    /// - `PORT`: port to bind on `0.0.0.0` (default: `8080`)
    /// - `LOG_LEVEL`: log filter when `RUST_LOG` is unset (default: `info`)
    /// - `DB_DRIVER`: `sqlite`, `postgres`, or `memory` (default: `sqlite`)
    /// - `DB_SOURCE`: `SQLite` path or `PostgreSQL` URL (default: `metadata.db`)
    /// - `IMDS_REQUEST_TIMEOUT_SECS`: per-request store deadline (default: `10`)
    /// - `IMDS_DEFAULT_VENDOR`: vendor served at `/vendor-data` (default: `default`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port: u16 = lookup("PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);
        let default_addr = SocketAddr::from(([0, 0, 0, 0], port));
        let bind_addr = lookup("IMDS_BIND_ADDR")
            .and_then(|addr| addr.parse().ok())
            .unwrap_or(default_addr);

        let source = lookup("DB_SOURCE").unwrap_or_else(|| "metadata.db".to_owned());
        let db_driver = match lookup("DB_DRIVER")
            .unwrap_or_else(|| "sqlite".to_owned())
            .to_lowercase()
            .as_str()
        {
            "memory" => DbDriver::Memory,
            "postgres" | "postgresql" => DbDriver::Postgres { url: source },
            _ => DbDriver::Sqlite { path: source },
        };

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        let request_timeout = lookup("IMDS_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .filter(|secs| *secs > 0)
            .map_or(Duration::from_secs(10), Duration::from_secs);

        let default_vendor = lookup("IMDS_DEFAULT_VENDOR")
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "default".to_owned());

        Self {
            bind_addr,
            db_driver,
            log_level,
            request_timeout,
            default_vendor,
        }
    }
}
