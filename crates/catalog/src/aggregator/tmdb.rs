//! TMDb (The Movie Database) API client
//!
//! Rate limit: 40 requests per 10 seconds
//! Cache: responses are kept for the configured TTL (default 24 hours)

use super::{build_cache, ProviderResponse, SearchHit, TitleDetail, Trailer, TranslatedPlot};
use crate::config::{CacheConfig, TmdbConfig};
use crate::normalizer::MediaType;
use crate::{CatalogError, Result};
use chrono::Utc;
use moka::future::Cache;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const PROVIDER: &str = "tmdb";

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// TMDb API client for search, details, trailers and translations
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    language: String,
    cache: Cache<String, ProviderResponse>,
}

impl TmdbClient {
    /// Create a new TMDb API client
    ///
    /// # Arguments
    /// * `api_key` - TMDb API key (v3)
    pub fn new(api_key: String) -> Self {
        let defaults = CacheConfig::default();
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            language: TmdbConfig::default().language,
            cache: build_cache(defaults.max_capacity, defaults.ttl()),
        }
    }

    /// Build a client from configuration
    pub fn from_config(config: &TmdbConfig, cache: &CacheConfig) -> Self {
        Self::new(config.api_key.clone())
            .with_base_url(config.base_url.clone())
            .with_language(config.language.clone())
            .with_cache_policy(cache.max_capacity, cache.ttl())
    }

    /// Point the client at another host (used by tests)
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Language used for translated title lookups (e.g. "pt-BR")
    pub fn with_language(mut self, language: String) -> Self {
        self.language = language;
        self
    }

    pub fn with_cache_policy(mut self, max_capacity: u64, ttl: Duration) -> Self {
        self.cache = build_cache(max_capacity, ttl);
        self
    }

    /// Search movies, series and people in one request
    pub async fn search_multi(&self, query: &str) -> Result<Vec<SearchHit>> {
        let url = format!(
            "{}/search/multi?api_key={}&query={}",
            self.base_url,
            self.api_key,
            urlencoding::encode(query)
        );
        let data = self
            .get_cached(format!("search_multi:{}", query), &url)
            .await?;
        parse_search_response(&data)
    }

    /// Get movie details by TMDb ID
    pub async fn get_movie_details(&self, movie_id: &str) -> Result<TitleDetail> {
        let url = format!(
            "{}/movie/{}?api_key={}",
            self.base_url, movie_id, self.api_key
        );
        let data = self
            .get_cached(format!("movie_details:{}", movie_id), &url)
            .await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Get TV show details by TMDb ID
    pub async fn get_tv_details(&self, tv_id: &str) -> Result<TitleDetail> {
        let url = format!("{}/tv/{}?api_key={}", self.base_url, tv_id, self.api_key);
        let data = self
            .get_cached(format!("tv_details:{}", tv_id), &url)
            .await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Get trailers and clips for a movie or TV show
    pub async fn get_videos(&self, media_type: MediaType, id: &str) -> Result<Vec<Trailer>> {
        let segment = path_segment(media_type)?;
        let url = format!(
            "{}/{}/{}/videos?api_key={}",
            self.base_url, segment, id, self.api_key
        );
        let data = self
            .get_cached(format!("{}_videos:{}", segment, id), &url)
            .await?;
        parse_videos_response(&data)
    }

    /// Get the localized title and overview in the configured language
    pub async fn get_translation(&self, media_type: MediaType, id: &str) -> Result<TranslatedPlot> {
        let segment = path_segment(media_type)?;
        let url = format!(
            "{}/{}/{}?api_key={}&language={}",
            self.base_url, segment, id, self.api_key, self.language
        );
        let data = self
            .get_cached(
                format!("{}_translation:{}:{}", segment, id, self.language),
                &url,
            )
            .await?;
        Ok(serde_json::from_value(data)?)
    }

    async fn get_cached(&self, cache_key: String, url: &str) -> Result<Value> {
        if let Some(cached) = self.cache.get(&cache_key).await {
            debug!(cache_key = %cache_key, "TMDb cache hit");
            return Ok(cached.data);
        }

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(CatalogError::upstream(
                PROVIDER,
                format!("{} returned {}", cache_key, response.status()),
            ));
        }

        let data: Value = response.json().await?;
        let response_data = ProviderResponse {
            data: data.clone(),
            fetched_at: Utc::now(),
            source: PROVIDER.to_string(),
        };

        self.cache.insert(cache_key, response_data).await;

        Ok(data)
    }
}

fn path_segment(media_type: MediaType) -> Result<&'static str> {
    match media_type {
        MediaType::Movie => Ok("movie"),
        MediaType::Series => Ok("tv"),
        MediaType::Person => Err(CatalogError::Internal(
            "people have no TMDb title endpoint".to_string(),
        )),
    }
}

/// Parse a multi search response, dropping items without an ID
fn parse_search_response(data: &Value) -> Result<Vec<SearchHit>> {
    let results = data
        .get("results")
        .and_then(|v| v.as_array())
        .ok_or_else(|| CatalogError::upstream(PROVIDER, "No results array in response"))?;

    Ok(results.iter().filter_map(parse_search_item).collect())
}

fn parse_search_item(item: &Value) -> Option<SearchHit> {
    let id = item.get("id").and_then(|v| v.as_i64())?.to_string();
    let text = |key: &str| item.get(key).and_then(|v| v.as_str()).map(str::to_string);

    Some(SearchHit {
        id,
        media_type: text("media_type").unwrap_or_default(),
        title: text("title"),
        name: text("name"),
    })
}

fn parse_videos_response(data: &Value) -> Result<Vec<Trailer>> {
    let results = data
        .get("results")
        .and_then(|v| v.as_array())
        .ok_or_else(|| CatalogError::upstream(PROVIDER, "No results array in videos response"))?;

    Ok(results
        .iter()
        .filter_map(|item| serde_json::from_value::<Trailer>(item.clone()).ok())
        .collect())
}
