//! Connection settings for [`SqlxStore`](crate::SqlxStore).
//!
//! Resolution order (lowest to highest priority):
//! 1. the `database:` section of a YAML file (optional)
//! 2. `.env` file (loaded into process environment, never overwriting)
//! 3. environment variables `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS`,
//!    `DATABASE_MIN_CONNECTIONS`, `DATABASE_ACQUIRE_TIMEOUT_SECS`

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::any::AnyPoolOptions;

use crate::error::ConfigError;
use crate::query::Dialect;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub min_connections: u32,
    #[serde(default)]
    pub acquire_timeout_secs: Option<u64>,
    /// Overrides the dialect guessed from the URL scheme.
    #[serde(default)]
    pub dialect: Option<Dialect>,
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

/// File section with every key optional, before the environment overlay.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStoreConfig {
    url: Option<String>,
    max_connections: Option<u32>,
    min_connections: Option<u32>,
    acquire_timeout_secs: Option<u64>,
    dialect: Option<Dialect>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    database: RawStoreConfig,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: 0,
            acquire_timeout_secs: None,
            dialect: None,
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    /// Parse the `database:` section of a YAML document. No environment overlay.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let raw = parse_yaml(content)?;
        raw.finish()
    }

    /// Load from an optional YAML file, then `.env`, then environment variables.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut raw = if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::Load(e.to_string()))?;
            parse_yaml(&content)?
        } else {
            RawStoreConfig::default()
        };
        let _ = dotenvy::dotenv();
        raw.overlay_env()?;
        raw.finish()
    }

    /// Environment variables only (after `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let mut raw = RawStoreConfig::default();
        raw.overlay_env()?;
        raw.finish()
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect.unwrap_or_else(|| Dialect::from_url(&self.url))
    }

    pub fn pool_options(&self) -> AnyPoolOptions {
        let options = AnyPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections);
        match self.acquire_timeout_secs {
            Some(secs) => options.acquire_timeout(Duration::from_secs(secs)),
            None => options,
        }
    }
}

fn parse_yaml(content: &str) -> Result<RawStoreConfig, ConfigError> {
    let file: ConfigFile =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Load(e.to_string()))?;
    Ok(file.database)
}

fn env_value<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(None),
    }
}

impl RawStoreConfig {
    fn overlay_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.url = Some(url);
        }
        if let Some(max) = env_value("DATABASE_MAX_CONNECTIONS")? {
            self.max_connections = Some(max);
        }
        if let Some(min) = env_value("DATABASE_MIN_CONNECTIONS")? {
            self.min_connections = Some(min);
        }
        if let Some(secs) = env_value("DATABASE_ACQUIRE_TIMEOUT_SECS")? {
            self.acquire_timeout_secs = Some(secs);
        }
        Ok(())
    }

    fn finish(self) -> Result<StoreConfig, ConfigError> {
        let url = self.url.ok_or(ConfigError::Missing("database.url"))?;
        Ok(StoreConfig {
            url,
            max_connections: self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
            min_connections: self.min_connections.unwrap_or(0),
            acquire_timeout_secs: self.acquire_timeout_secs,
            dialect: self.dialect,
        })
    }
}
