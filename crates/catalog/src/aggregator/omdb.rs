//! OMDb (Open Movie Database) API client
//!
//! OMDb answers every request with HTTP 200 and signals misses through a
//! `"Response": "False"` envelope, so failures are data here, not errors.

use super::{build_cache, CanonicalDetail, CanonicalLookup, CanonicalMatch, ProviderResponse};
use crate::config::{CacheConfig, OmdbConfig};
use crate::{CatalogError, Result};
use chrono::Utc;
use moka::future::Cache;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

pub const PROVIDER: &str = "omdb";

const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com";

/// OMDb API client for canonical IMDb lookups
pub struct OmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    cache: Cache<String, ProviderResponse>,
}

impl OmdbClient {
    /// Create a new OMDb API client
    ///
    /// # Arguments
    /// * `api_key` - OMDb API key
    pub fn new(api_key: String) -> Self {
        let defaults = CacheConfig::default();
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            cache: build_cache(defaults.max_capacity, defaults.ttl()),
        }
    }

    pub fn from_config(config: &OmdbConfig, cache: &CacheConfig) -> Self {
        let mut client = Self::new(config.api_key.clone()).with_base_url(config.base_url.clone());
        client.cache = build_cache(cache.max_capacity, cache.ttl());
        client
    }

    /// Point the client at another host (used by tests)
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Search titles by name (`?s=`)
    pub async fn search_by_name(&self, name: &str) -> Result<CanonicalLookup> {
        let url = format!(
            "{}/?apikey={}&s={}",
            self.base_url,
            self.api_key,
            urlencoding::encode(name)
        );
        match self.get_cached(format!("search:{}", name), &url).await? {
            Some(data) => parse_lookup_response(&data),
            None => Ok(CanonicalLookup::default()),
        }
    }

    /// Get full detail by IMDb ID (`?i=`)
    ///
    /// Returns `None` when the body is empty or `null`.
    pub async fn get_by_imdb_id(&self, imdb_id: &str) -> Result<Option<CanonicalDetail>> {
        let url = format!(
            "{}/?apikey={}&i={}&plot=full",
            self.base_url,
            self.api_key,
            urlencoding::encode(imdb_id)
        );
        match self.get_cached(format!("detail:{}", imdb_id), &url).await? {
            Some(data) => Ok(Some(serde_json::from_value(data)?)),
            None => Ok(None),
        }
    }

    async fn get_cached(&self, cache_key: String, url: &str) -> Result<Option<Value>> {
        if let Some(cached) = self.cache.get(&cache_key).await {
            debug!(cache_key = %cache_key, "OMDb cache hit");
            return Ok(Some(cached.data));
        }

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(CatalogError::upstream(
                PROVIDER,
                format!("{} returned {}", cache_key, response.status()),
            ));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        let data: Value = serde_json::from_str(&body)?;
        if is_empty_payload(&data) {
            return Ok(None);
        }

        // Failure envelopes include quota and outage errors, so only successes are kept
        if parse_flag(data.get("Response")) {
            let response_data = ProviderResponse {
                data: data.clone(),
                fetched_at: Utc::now(),
                source: PROVIDER.to_string(),
            };
            self.cache.insert(cache_key, response_data).await;
        } else {
            debug!(cache_key = %cache_key, error = ?data.get("Error"), "OMDb failure envelope not cached");
        }

        Ok(Some(data))
    }
}

fn is_empty_payload(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn parse_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}

/// Accept OMDb's `"True"`/`"False"` strings as well as plain booleans
pub(crate) fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_flag(Some(&value)))
}

fn parse_lookup_response(data: &Value) -> Result<CanonicalLookup> {
    let response = parse_flag(data.get("Response"));
    let matches = match data.get("Search").and_then(|v| v.as_array()) {
        Some(items) => items
            .iter()
            .filter_map(|item| serde_json::from_value::<CanonicalMatch>(item.clone()).ok())
            .collect(),
        None => Vec::new(),
    };

    Ok(CanonicalLookup { response, matches })
}
