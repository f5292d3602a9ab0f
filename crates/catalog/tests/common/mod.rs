//! Shared fixtures for catalog integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use media_catalog::aggregator::{
    CanonicalDetail, CanonicalLookup, CanonicalMatch, ProviderGateway, SearchHit, TitleDetail,
    Trailer, TranslatedPlot,
};
use media_catalog::normalizer::{FinalRecord, MediaType, NOT_AVAILABLE};
use media_catalog::{CatalogError, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted provider gateway with call counters
#[derive(Default)]
pub struct StubGateway {
    pub search: HashMap<String, Vec<SearchHit>>,
    pub movie_details: HashMap<String, TitleDetail>,
    pub series_details: HashMap<String, TitleDetail>,
    pub trailers: HashMap<String, Vec<Trailer>>,
    pub canonical_by_name: HashMap<String, CanonicalLookup>,
    pub canonical_details: HashMap<String, CanonicalDetail>,
    pub translations: HashMap<String, TranslatedPlot>,
    /// Served in order by `detail_by_canonical_id` before falling back to the map
    pub detail_queue: Mutex<VecDeque<Option<CanonicalDetail>>>,
    pub fail_translations: bool,
    pub title_detail_calls: AtomicUsize,
    pub canonical_detail_calls: AtomicUsize,
}

impl StubGateway {
    pub fn title_detail_calls(&self) -> usize {
        self.title_detail_calls.load(Ordering::SeqCst)
    }

    pub fn canonical_detail_calls(&self) -> usize {
        self.canonical_detail_calls.load(Ordering::SeqCst)
    }

    pub fn queue_details(&self, details: Vec<Option<CanonicalDetail>>) {
        self.detail_queue.lock().unwrap().extend(details);
    }
}

#[async_trait]
impl ProviderGateway for StubGateway {
    async fn search_titles(&self, query: &str) -> Result<Vec<SearchHit>> {
        Ok(self.search.get(query).cloned().unwrap_or_default())
    }

    async fn movie_detail(&self, id: &str) -> Result<TitleDetail> {
        self.title_detail_calls.fetch_add(1, Ordering::SeqCst);
        self.movie_details
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::upstream("tmdb", format!("movie {} returned 404", id)))
    }

    async fn series_detail(&self, id: &str) -> Result<TitleDetail> {
        self.title_detail_calls.fetch_add(1, Ordering::SeqCst);
        self.series_details
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::upstream("tmdb", format!("tv {} returned 404", id)))
    }

    async fn movie_trailers(&self, id: &str) -> Result<Vec<Trailer>> {
        Ok(self.trailers.get(id).cloned().unwrap_or_default())
    }

    async fn series_trailers(&self, id: &str) -> Result<Vec<Trailer>> {
        Ok(self.trailers.get(id).cloned().unwrap_or_default())
    }

    async fn lookup_canonical_id_by_name(&self, name: &str) -> Result<CanonicalLookup> {
        Ok(self.canonical_by_name.get(name).cloned().unwrap_or_default())
    }

    async fn detail_by_canonical_id(&self, imdb_id: &str) -> Result<Option<CanonicalDetail>> {
        self.canonical_detail_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(next) = self.detail_queue.lock().unwrap().pop_front() {
            return Ok(next);
        }

        Ok(Some(
            self.canonical_details
                .get(imdb_id)
                .cloned()
                .unwrap_or_else(|| failure_envelope("Incorrect IMDb ID.")),
        ))
    }

    async fn translated_plot(&self, rich_id: &str, _media_type: MediaType) -> Result<TranslatedPlot> {
        if self.fail_translations {
            return Err(CatalogError::upstream("tmdb", "translation returned 503"));
        }
        Ok(self.translations.get(rich_id).cloned().unwrap_or_default())
    }
}

pub fn movie_hit(id: &str, title: &str) -> SearchHit {
    SearchHit {
        id: id.to_string(),
        media_type: "movie".to_string(),
        title: Some(title.to_string()),
        name: None,
    }
}

pub fn series_hit(id: &str, name: &str) -> SearchHit {
    SearchHit {
        id: id.to_string(),
        media_type: "tv".to_string(),
        title: None,
        name: Some(name.to_string()),
    }
}

pub fn person_hit(id: &str, name: &str) -> SearchHit {
    SearchHit {
        id: id.to_string(),
        media_type: "person".to_string(),
        title: None,
        name: Some(name.to_string()),
    }
}

pub fn movie_detail(title: &str, status: &str, imdb_id: Option<&str>) -> TitleDetail {
    TitleDetail {
        title: Some(title.to_string()),
        name: None,
        status: Some(status.to_string()),
        imdb_id: imdb_id.map(str::to_string),
    }
}

pub fn series_detail(name: &str, status: &str) -> TitleDetail {
    TitleDetail {
        title: None,
        name: Some(name.to_string()),
        status: Some(status.to_string()),
        imdb_id: None,
    }
}

pub fn canonical_detail(imdb_id: &str, title: &str, genre: &str) -> CanonicalDetail {
    CanonicalDetail {
        response: true,
        title: Some(title.to_string()),
        media_type: Some("movie".to_string()),
        imdb_id: Some(imdb_id.to_string()),
        year: Some("1999".to_string()),
        genre: Some(genre.to_string()),
        director: Some("Lana Wachowski, Lilly Wachowski".to_string()),
        actors: Some("Keanu Reeves, Laurence Fishburne".to_string()),
        poster: Some(format!("https://posters.example/{}.jpg", imdb_id)),
        imdb_rating: Some("8.7".to_string()),
        plot: Some(format!("Plot of {}", title)),
        error: None,
    }
}

pub fn failure_envelope(error: &str) -> CanonicalDetail {
    CanonicalDetail {
        response: false,
        error: Some(error.to_string()),
        ..Default::default()
    }
}

pub fn canonical_lookup(imdb_ids: &[&str]) -> CanonicalLookup {
    CanonicalLookup {
        response: true,
        matches: imdb_ids
            .iter()
            .map(|id| CanonicalMatch {
                imdb_id: id.to_string(),
                title: String::new(),
                year: None,
            })
            .collect(),
    }
}

pub fn final_record(external_id: &str, title: &str, genre: &str) -> FinalRecord {
    FinalRecord {
        title: title.to_string(),
        translated_title: title.to_string(),
        poster_url: NOT_AVAILABLE.to_string(),
        external_id: external_id.to_string(),
        year: "2001".to_string(),
        genre: genre.to_string(),
        director: "Someone".to_string(),
        actors: "Someone Else".to_string(),
        rating_value: "7.0".to_string(),
        plot: NOT_AVAILABLE.to_string(),
        videos: NOT_AVAILABLE.to_string(),
    }
}

/// Gateway scripted for the "Matrix" query
pub fn matrix_gateway() -> StubGateway {
    let mut gateway = StubGateway::default();
    gateway
        .search
        .insert("Matrix".to_string(), vec![movie_hit("603", "The Matrix")]);
    gateway.movie_details.insert(
        "603".to_string(),
        movie_detail("The Matrix", "Released", Some("tt0133093")),
    );
    gateway.trailers.insert(
        "603".to_string(),
        vec![Trailer {
            site: "YouTube".to_string(),
            key: "vKQi3bBA1y8".to_string(),
        }],
    );
    gateway.canonical_details.insert(
        "tt0133093".to_string(),
        canonical_detail("tt0133093", "The Matrix", "Action, Sci-Fi"),
    );
    gateway.translations.insert(
        "603".to_string(),
        TranslatedPlot {
            title: Some("Matrix".to_string()),
            name: None,
            overview: Some("Um hacker descobre a verdade sobre a realidade.".to_string()),
        },
    );
    gateway
}
