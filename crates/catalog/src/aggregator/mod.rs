//! Provider clients for the two external catalogs
//!
//! TMDb supplies search, details, trailers and translations. OMDb supplies the
//! canonical IMDb identifiers and the detail records keyed by them.

use crate::{normalizer::MediaType, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub mod gateway;
pub mod omdb;
pub mod tmdb;

pub use gateway::HttpProviderGateway;
pub use omdb::OmdbClient;
pub use tmdb::TmdbClient;

/// Cached raw provider response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Response body
    pub data: Value,
    /// Response timestamp
    pub fetched_at: DateTime<Utc>,
    /// Source API
    pub source: String,
}

pub(crate) fn build_cache(max_capacity: u64, ttl: Duration) -> Cache<String, ProviderResponse> {
    Cache::builder()
        .max_capacity(max_capacity)
        .time_to_live(ttl)
        .build()
}

/// Hit returned by the TMDb multi search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// TMDb ID
    pub id: String,
    /// Provider media type ("movie", "tv", "person")
    pub media_type: String,
    /// Movie title
    pub title: Option<String>,
    /// Series or person name
    pub name: Option<String>,
}

impl SearchHit {
    /// Name shown for the hit, preferring `name` over `title` as TMDb does for series
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.title.clone())
            .unwrap_or_default()
    }
}

/// Movie or series detail from TMDb
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TitleDetail {
    pub title: Option<String>,
    pub name: Option<String>,
    /// Release status ("Released", "Planned", "Returning Series", ...)
    pub status: Option<String>,
    /// IMDb ID when TMDb knows it
    pub imdb_id: Option<String>,
}

/// Trailer or clip attached to a TMDb title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trailer {
    pub site: String,
    pub key: String,
}

/// Result of an OMDb search by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalLookup {
    /// OMDb `Response` flag
    pub response: bool,
    pub matches: Vec<CanonicalMatch>,
}

/// Single OMDb search match
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalMatch {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
}

/// OMDb detail record, or its failure envelope when `response` is false
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CanonicalDetail {
    #[serde(rename = "Response", deserialize_with = "omdb::deserialize_flag", default)]
    pub response: bool,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Type")]
    pub media_type: Option<String>,
    #[serde(rename = "imdbID")]
    pub imdb_id: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Genre")]
    pub genre: Option<String>,
    #[serde(rename = "Director")]
    pub director: Option<String>,
    #[serde(rename = "Actors")]
    pub actors: Option<String>,
    #[serde(rename = "Poster")]
    pub poster: Option<String>,
    #[serde(rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(rename = "Plot")]
    pub plot: Option<String>,
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

/// Localized title and overview from TMDb
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TranslatedPlot {
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
}

/// Lookup capability over both catalogs
///
/// Implementations return provider-native shapes; mapping into catalog
/// records happens in [`crate::normalizer`].
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Multi search over movies, series and people
    async fn search_titles(&self, query: &str) -> Result<Vec<SearchHit>>;

    async fn movie_detail(&self, id: &str) -> Result<TitleDetail>;

    async fn series_detail(&self, id: &str) -> Result<TitleDetail>;

    async fn movie_trailers(&self, id: &str) -> Result<Vec<Trailer>>;

    async fn series_trailers(&self, id: &str) -> Result<Vec<Trailer>>;

    /// Search the canonical catalog by display name
    async fn lookup_canonical_id_by_name(&self, name: &str) -> Result<CanonicalLookup>;

    /// Fetch the canonical detail record
    ///
    /// `Ok(None)` means the provider returned no payload at all, which is
    /// distinct from a failure envelope (`response == false`).
    async fn detail_by_canonical_id(&self, imdb_id: &str) -> Result<Option<CanonicalDetail>>;

    /// Localized title and overview for a TMDb title
    async fn translated_plot(&self, rich_id: &str, media_type: MediaType)
        -> Result<TranslatedPlot>;
}
