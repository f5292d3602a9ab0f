//! Media Catalog Reconciliation
//!
//! This crate aggregates movie and series metadata from two external catalogs
//! (TMDb for rich metadata, OMDb for canonical IMDb identifiers) into a local
//! store. Titles are resolved across both providers, staged as provisional
//! records, and promoted into de-duplicated final records keyed by IMDb ID.

pub mod aggregator;
pub mod config;
pub mod normalizer;
pub mod rate_limit;
pub mod reconciliation;
pub mod repository;
pub mod sampling;
pub mod server;

// Re-export main types
pub use aggregator::{HttpProviderGateway, OmdbClient, ProviderGateway, TmdbClient};
pub use config::CatalogConfig;
pub use normalizer::{FinalRecord, MediaType, ProvisionalRecord, NOT_AVAILABLE};
pub use rate_limit::RateLimitManager;
pub use reconciliation::{Candidate, FieldFilters, ReconciliationEngine};
pub use repository::{InMemoryRecordStore, PostgresRecordStore, RecordStore};
pub use sampling::SamplingService;

/// Common error type for the catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("No results found: {0}")]
    NotFound(String),

    #[error("Upstream provider {provider} unavailable: {message}")]
    UpstreamUnavailable { provider: String, message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Shorthand for an upstream failure attributed to a provider
    pub fn upstream(provider: &str, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// True when the error means "nothing matched" rather than "something broke"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Provider keys travel in the query string, so the URL never reaches the error
impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.without_url())
    }
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
pub type Error = CatalogError;
