//! Server Configuration
//!
//! Settings come from built-in defaults overridden by environment variables
//! (`DATABASE_URL`, `MAX_CONNECTIONS`, `BIND_ADDR`, `LOG_FORMAT`).

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Default store for local and demo use
pub const DEFAULT_DATABASE_URL: &str = "sqlite://temp_monitor.db";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Runtime settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Store connection string
    pub database_url: String,
    /// Pool size
    pub max_connections: u32,
    /// Listen address
    pub bind_addr: String,
    pub log_format: LogFormat,
}

impl Settings {
    /// Load settings from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_env(Environment::default())
    }

    fn from_env(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("max_connections", 5)?
            .set_default("bind_addr", "0.0.0.0:8080")?
            .set_default("log_format", "pretty")?
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
