//! Canonical record shapes and pure mappings from provider responses
//!
//! Every string field on a record is always present. A value the providers
//! did not supply is stored as [`NOT_AVAILABLE`] and must be read as "absent".

use crate::aggregator::{CanonicalDetail, SearchHit, TitleDetail, Trailer, TranslatedPlot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for a field no provider supplied
pub const NOT_AVAILABLE: &str = "N/A";

/// Only YouTube trailer keys map to a playable URL
const YOUTUBE_SITE: &str = "YouTube";

/// Media type of a title or search hit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
    Person,
}

impl MediaType {
    /// Parse TMDb (`movie`, `tv`, `person`) or catalog (`series`) spellings
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "movie" => Some(Self::Movie),
            "tv" | "series" => Some(Self::Series),
            "person" => Some(Self::Person),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
            Self::Person => "person",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Title search hit carried through a single reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// TMDb ID
    pub id: String,
    pub media_type: MediaType,
    pub display_name: String,
}

impl Candidate {
    /// Map a search hit, or `None` when its media type is unknown
    pub fn from_hit(hit: &SearchHit) -> Option<Self> {
        Some(Self {
            id: hit.id.clone(),
            media_type: MediaType::parse(&hit.media_type)?,
            display_name: hit.display_name(),
        })
    }
}

/// Tentative entry staged before enrichment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionalRecord {
    pub title: String,
    pub media_type: MediaType,
    /// IMDb ID, empty until backfilled
    pub external_id: String,
    /// TMDb ID
    pub rich_provider_id: String,
    /// Trailer summary or [`NOT_AVAILABLE`]
    pub videos: String,
}

/// Enriched, de-duplicated catalog entry keyed by `external_id`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FinalRecord {
    pub title: String,
    pub translated_title: String,
    pub poster_url: String,
    pub external_id: String,
    pub year: String,
    pub genre: String,
    pub director: String,
    pub actors: String,
    pub rating_value: String,
    pub plot: String,
    pub videos: String,
}

/// Normalize a provider string, treating blanks and OMDb's own "N/A" as absent
pub fn present(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != NOT_AVAILABLE)
}

/// Provider string or [`NOT_AVAILABLE`]
pub fn or_sentinel(value: Option<&str>) -> String {
    present(value).unwrap_or(NOT_AVAILABLE).to_string()
}

/// Whether a stored field holds real data
pub fn is_available(value: &str) -> bool {
    present(Some(value)).is_some()
}

/// Render one trailer as a playable URL or a site/key descriptor
pub fn trailer_entry(trailer: &Trailer) -> String {
    if trailer.site == YOUTUBE_SITE {
        format!("https://www.youtube.com/watch?v={}", trailer.key)
    } else {
        format!("Site:{}, Key:{}", trailer.site, trailer.key)
    }
}

/// Comma-joined trailer summary, or [`NOT_AVAILABLE`] for no trailers
pub fn summarize_trailers(trailers: &[Trailer]) -> String {
    if trailers.is_empty() {
        return NOT_AVAILABLE.to_string();
    }

    trailers
        .iter()
        .map(trailer_entry)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Minimal detail rebuilt around an IMDb ID found by name lookup
///
/// Used for titles (typically series) whose TMDb detail carries no IMDb ID.
pub fn backfill_canonical_id(detail: &TitleDetail, imdb_id: String) -> TitleDetail {
    TitleDetail {
        title: detail.name.clone().or_else(|| detail.title.clone()),
        name: detail.name.clone(),
        status: detail.status.clone(),
        imdb_id: Some(imdb_id),
    }
}

/// Stage an accepted candidate
pub fn build_provisional(
    candidate: &Candidate,
    detail: &TitleDetail,
    videos: String,
) -> ProvisionalRecord {
    let title = present(detail.title.as_deref())
        .unwrap_or(candidate.display_name.as_str())
        .to_string();

    ProvisionalRecord {
        title,
        media_type: candidate.media_type,
        external_id: detail.imdb_id.clone().unwrap_or_default(),
        rich_provider_id: candidate.id.clone(),
        videos,
    }
}

/// Merge a provisional record with its canonical detail and translation
///
/// The translated plot wins over the original when present. Without a
/// translation the translated title is [`NOT_AVAILABLE`].
pub fn build_final(
    provisional: &ProvisionalRecord,
    detail: &CanonicalDetail,
    translation: Option<&TranslatedPlot>,
) -> FinalRecord {
    let translated_title = translation
        .and_then(|t| present(t.title.as_deref()).or_else(|| present(t.name.as_deref())));
    let translated_plot = translation.and_then(|t| present(t.overview.as_deref()));

    FinalRecord {
        title: or_sentinel(Some(provisional.title.as_str())),
        translated_title: or_sentinel(translated_title),
        poster_url: or_sentinel(detail.poster.as_deref()),
        external_id: provisional.external_id.clone(),
        year: or_sentinel(detail.year.as_deref()),
        genre: or_sentinel(detail.genre.as_deref()),
        director: or_sentinel(detail.director.as_deref()),
        actors: or_sentinel(detail.actors.as_deref()),
        rating_value: or_sentinel(detail.imdb_rating.as_deref()),
        plot: or_sentinel(translated_plot.or(detail.plot.as_deref())),
        videos: or_sentinel(Some(provisional.videos.as_str())),
    }
}

/// Final-record shape for a title drawn straight from the canonical catalog
pub fn from_canonical_detail(detail: &CanonicalDetail) -> FinalRecord {
    FinalRecord {
        title: or_sentinel(detail.title.as_deref()),
        translated_title: NOT_AVAILABLE.to_string(),
        poster_url: or_sentinel(detail.poster.as_deref()),
        external_id: or_sentinel(detail.imdb_id.as_deref()),
        year: or_sentinel(detail.year.as_deref()),
        genre: or_sentinel(detail.genre.as_deref()),
        director: or_sentinel(detail.director.as_deref()),
        actors: or_sentinel(detail.actors.as_deref()),
        rating_value: or_sentinel(detail.imdb_rating.as_deref()),
        plot: or_sentinel(detail.plot.as_deref()),
        videos: NOT_AVAILABLE.to_string(),
    }
}
