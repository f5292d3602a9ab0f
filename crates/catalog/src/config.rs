//! Catalog service configuration
//!
//! Values come from `config/catalog.{toml,yaml,json}` when present and are
//! overridden by `CATALOG__*` environment variables, for example
//! `CATALOG__TMDB__API_KEY` or `CATALOG__SAMPLING__MAX_ATTEMPTS`.

use crate::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Catalog Service Configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// TMDb (rich metadata) provider
    pub tmdb: TmdbConfig,

    /// OMDb (canonical identifier) provider
    pub omdb: OmdbConfig,

    /// Provider response cache
    pub cache: CacheConfig,

    /// Random sampling
    pub sampling: SamplingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    /// Server port (default: 8086)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8086,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    pub max_connections: u32,

    /// Connection timeout (seconds)
    pub connect_timeout_sec: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/media_catalog".to_string(),
            max_connections: 10,
            connect_timeout_sec: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: String,

    /// Language for translated titles and overviews
    pub language: String,

    pub requests_per_window: u32,
    pub window_sec: u64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.themoviedb.org/3".to_string(),
            language: "pt-BR".to_string(),
            requests_per_window: 40,
            window_sec: 10,
        }
    }
}

impl TmdbConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_sec)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OmdbConfig {
    pub api_key: String,
    pub base_url: String,
    pub requests_per_window: u32,
    pub window_sec: u64,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://www.omdbapi.com".to_string(),
            requests_per_window: 1000,
            window_sec: 86400,
        }
    }
}

impl OmdbConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_sec)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_capacity: u64,

    /// Time to live (seconds)
    pub ttl_sec: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl_sec: 86400,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_sec)
    }
}

/// Bounds for drawing random canonical IDs (`tt0000001` ..= `tt9999999`)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Draw-and-fetch attempts before giving up
    pub max_attempts: u32,

    /// Two-letter tag in front of the numeric part
    pub id_prefix: String,

    /// Zero-padded width of the numeric part
    pub id_width: usize,

    pub id_upper_bound: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            id_prefix: "tt".to_string(),
            id_width: 7,
            id_upper_bound: 9_999_999,
        }
    }
}

impl CatalogConfig {
    /// Load configuration from environment and config file
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/catalog").required(false))
            .add_source(config::Environment::with_prefix("CATALOG").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.tmdb.api_key.trim().is_empty() {
            return Err(CatalogError::ConfigError(
                "tmdb.api_key must be set (CATALOG__TMDB__API_KEY)".to_string(),
            ));
        }

        if self.omdb.api_key.trim().is_empty() {
            return Err(CatalogError::ConfigError(
                "omdb.api_key must be set (CATALOG__OMDB__API_KEY)".to_string(),
            ));
        }

        for (key, value) in [
            ("tmdb.base_url", &self.tmdb.base_url),
            ("omdb.base_url", &self.omdb.base_url),
            ("database.url", &self.database.url),
        ] {
            url::Url::parse(value)
                .map_err(|e| CatalogError::ConfigError(format!("Invalid {}: {}", key, e)))?;
        }

        if self.sampling.max_attempts == 0 {
            return Err(CatalogError::ConfigError(
                "sampling.max_attempts must be greater than 0".to_string(),
            ));
        }

        if self.sampling.id_upper_bound == 0 {
            return Err(CatalogError::ConfigError(
                "sampling.id_upper_bound must be greater than 0".to_string(),
            ));
        }

        let prefix = &self.sampling.id_prefix;
        if prefix.len() != 2 || !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CatalogError::ConfigError(format!(
                "sampling.id_prefix must be two ASCII letters, got {:?}",
                prefix
            )));
        }

        Ok(())
    }
}
