//! Service configuration
//!
//! Built-in defaults, overridden by an optional `config/data-api.*` file and
//! then by `DATA_API__SECTION__KEY` environment variables.

use crate::rate_limit::RateLimitConfig;
use crate::ApiError;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;
use storage::DatabaseConfig;
use thiserror::Error;

/// Default location of the settings file, extension optional
pub const DEFAULT_CONFIG_PATH: &str = "config/data-api";

/// Settings loading errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub addr: String,
    /// Per-request deadline
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Paging limits for `GET /data`
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationConfig {
    pub default_rows_per_page: u32,
    pub max_rows_per_page: u32,
}

impl PaginationConfig {
    /// Resolve a requested page size against the limits
    pub fn rows_per_page(&self, requested: Option<u32>) -> Result<u32, ApiError> {
        match requested {
            None => Ok(self.default_rows_per_page),
            Some(0) => Err(ApiError::InvalidRequest),
            Some(rows) => Ok(rows.min(self.max_rows_per_page)),
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_rows_per_page: 10,
            max_rows_per_page: 500,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete service settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub pagination: PaginationConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Load from [`DEFAULT_CONFIG_PATH`] and the environment
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load from a specific file (which may be missing) and the environment
    pub fn load_from(path: &str) -> Result<Self, SettingsError> {
        let defaults = Settings::default();

        let settings = Config::builder()
            .set_default("server.addr", defaults.server.addr)?
            .set_default(
                "server.request_timeout_secs",
                defaults.server.request_timeout_secs as i64,
            )?
            .set_default("database.url", defaults.database.url)?
            .set_default(
                "database.max_connections",
                defaults.database.max_connections as i64,
            )?
            .set_default(
                "pagination.default_rows_per_page",
                defaults.pagination.default_rows_per_page as i64,
            )?
            .set_default(
                "pagination.max_rows_per_page",
                defaults.pagination.max_rows_per_page as i64,
            )?
            .set_default("rate_limit.enabled", defaults.rate_limit.enabled)?
            .set_default("rate_limit.per_second", defaults.rate_limit.per_second as i64)?
            .set_default("rate_limit.burst_size", defaults.rate_limit.burst_size as i64)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.json", defaults.logging.json)?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("DATA_API")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
