//! Cross-provider title reconciliation
//!
//! A title query is resolved against TMDb, each hit is expanded with its
//! details and trailers, and hits that carry a usable IMDb ID are staged as
//! provisional records. Each staged record is then matched against the final
//! catalog and, when missing, enriched from OMDb and promoted.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::aggregator::{ProviderGateway, TitleDetail};
use crate::normalizer::{
    backfill_canonical_id, build_final, build_provisional, present, summarize_trailers,
    FinalRecord, MediaType, ProvisionalRecord,
};
use crate::repository::RecordStore;
use crate::{CatalogError, Result};

pub use crate::normalizer::Candidate;
pub use crate::repository::FieldFilters;

/// Release status TMDb uses for announced but unreleased titles
const PLANNED_STATUS: &str = "Planned";

/// Whether a title detail may be persisted
///
/// The title must not be merely planned and must carry a non-empty IMDb ID.
pub fn passes_validity_gate(detail: &TitleDetail) -> bool {
    let planned = detail.status.as_deref() == Some(PLANNED_STATUS);
    let has_canonical_id = detail
        .imdb_id
        .as_deref()
        .map(|id| !id.trim().is_empty())
        .unwrap_or(false);

    !planned && has_canonical_id
}

/// Orchestrates provider lookups and the provisional → final record flow
pub struct ReconciliationEngine {
    gateway: Arc<dyn ProviderGateway>,
    store: Arc<dyn RecordStore>,
}

impl ReconciliationEngine {
    pub fn new(gateway: Arc<dyn ProviderGateway>, store: Arc<dyn RecordStore>) -> Self {
        Self { gateway, store }
    }

    /// Final records stored under `external_id`; empty when there are none
    pub async fn search_local(&self, external_id: &str) -> Result<Vec<FinalRecord>> {
        self.store.find_final(external_id).await
    }

    /// Title search hits as candidates, in provider order
    ///
    /// Hits with a media type outside movie/series/person are dropped.
    pub async fn resolve_candidates(&self, query: &str) -> Result<Vec<Candidate>> {
        let hits = self.gateway.search_titles(query).await?;

        Ok(hits
            .iter()
            .filter_map(|hit| {
                let candidate = Candidate::from_hit(hit);
                if candidate.is_none() {
                    debug!(id = %hit.id, media_type = %hit.media_type, "Dropping hit with unknown media type");
                }
                candidate
            })
            .collect())
    }

    /// Display names of the movie and series hits for `query`
    pub async fn suggest_titles(&self, query: &str) -> Result<Vec<String>> {
        Ok(self
            .resolve_candidates(query)
            .await?
            .into_iter()
            .filter(|c| c.media_type != MediaType::Person)
            .map(|c| c.display_name)
            .collect())
    }

    /// Expand a candidate into a staged provisional record
    ///
    /// Returns `Ok(None)` for people and for candidates that fail the
    /// validity gate; neither has side effects. Every accepted call inserts a
    /// new provisional record, even if an identical one is already staged.
    pub async fn expand_candidate(&self, candidate: &Candidate) -> Result<Option<ProvisionalRecord>> {
        let (detail, trailers) = match candidate.media_type {
            MediaType::Person => {
                debug!(id = %candidate.id, "Skipping person candidate");
                return Ok(None);
            }
            MediaType::Movie => tokio::join!(
                self.gateway.movie_detail(&candidate.id),
                self.gateway.movie_trailers(&candidate.id)
            ),
            MediaType::Series => tokio::join!(
                self.gateway.series_detail(&candidate.id),
                self.gateway.series_trailers(&candidate.id)
            ),
        };
        let mut detail = detail?;
        let videos = summarize_trailers(&trailers?);

        if present(detail.imdb_id.as_deref()).is_none() {
            let lookup = self
                .gateway
                .lookup_canonical_id_by_name(&candidate.display_name)
                .await?;

            match lookup.matches.first() {
                Some(first) if lookup.response => {
                    debug!(
                        name = %candidate.display_name,
                        imdb_id = %first.imdb_id,
                        "Backfilled canonical ID by name"
                    );
                    detail = backfill_canonical_id(&detail, first.imdb_id.clone());
                }
                _ => debug!(name = %candidate.display_name, "No canonical ID found by name"),
            }
        }

        if !passes_validity_gate(&detail) {
            debug!(
                id = %candidate.id,
                media_type = %candidate.media_type,
                status = ?detail.status,
                imdb_id = ?detail.imdb_id,
                "Candidate rejected by validity gate"
            );
            return Ok(None);
        }

        let record = build_provisional(candidate, &detail, videos);
        self.store.insert_provisional(&record).await?;

        debug!(
            title = %record.title,
            external_id = %record.external_id,
            "Staged provisional record"
        );
        Ok(Some(record))
    }

    /// Resolve a free-text title into final catalog records
    ///
    /// Fails with `NotFound` when the provider has no hits at all. Results are
    /// de-duplicated by IMDb ID.
    pub async fn reconcile_title(&self, query: &str) -> Result<Vec<FinalRecord>> {
        debug!(query = %query, "Searching titles related to query");

        let candidates = self.resolve_candidates(query).await?;
        if candidates.is_empty() {
            return Err(CatalogError::NotFound(format!(
                "no titles found for {:?}",
                query
            )));
        }

        let mut accepted = Vec::new();
        for candidate in &candidates {
            if let Some(record) = self.expand_candidate(candidate).await? {
                accepted.push(record);
            }
        }

        debug!(
            candidates = candidates.len(),
            accepted = accepted.len(),
            "Candidates expanded, checking local catalog"
        );

        let mut results = Vec::new();
        let mut seen = HashSet::new();

        for record in &accepted {
            let mut entries = self.search_local(&record.external_id).await?;

            if entries.is_empty() {
                self.promote(record).await?;
                entries = self.search_local(&record.external_id).await?;
            } else {
                // Already promoted earlier: drop the copy staged by this pass
                let cleared = self.store.delete_provisional(&record.external_id).await?;
                debug!(
                    external_id = %record.external_id,
                    cleared,
                    "Final record exists, cleared staged duplicates"
                );
            }

            for entry in entries {
                if seen.insert(entry.external_id.clone()) {
                    results.push(entry);
                }
            }
        }

        info!(query = %query, results = results.len(), "Title reconciliation finished");
        Ok(results)
    }

    /// Enrich a provisional record and commit it as a final record
    ///
    /// Returns `Ok(false)` without writing when OMDb has no usable detail, or
    /// when a final record for the same IMDb ID already exists. A failed
    /// translation lookup leaves the translated title unset and keeps the original plot.
    pub async fn promote(&self, record: &ProvisionalRecord) -> Result<bool> {
        let (detail, translation) = tokio::join!(
            self.gateway.detail_by_canonical_id(&record.external_id),
            self.gateway
                .translated_plot(&record.rich_provider_id, record.media_type)
        );

        let detail = match detail? {
            Some(detail) if detail.response => detail,
            other => {
                warn!(
                    external_id = %record.external_id,
                    error = ?other.and_then(|d| d.error),
                    "Canonical detail unavailable, skipping promotion"
                );
                return Ok(false);
            }
        };

        let translation = match translation {
            Ok(translation) => Some(translation),
            Err(e) => {
                warn!(
                    external_id = %record.external_id,
                    error = %e,
                    "Translation lookup failed, keeping original plot"
                );
                None
            }
        };

        let final_record = build_final(record, &detail, translation.as_ref());
        let inserted = self.store.commit_promotion(&final_record).await?;

        info!(
            external_id = %final_record.external_id,
            title = %final_record.title,
            inserted,
            "Promoted provisional record"
        );
        Ok(inserted)
    }

    /// Final records matching every present filter
    ///
    /// An empty filter set matches the whole catalog. No match at all is
    /// reported as `NotFound`.
    pub async fn filter_by_fields(&self, filters: &FieldFilters) -> Result<Vec<FinalRecord>> {
        debug!(filters = ?filters, "Filtering catalog");

        let records = self.store.filter_final(filters).await?;
        if records.is_empty() {
            return Err(CatalogError::NotFound(
                "no titles match the given filters".to_string(),
            ));
        }

        debug!(results = records.len(), "Filters applied");
        Ok(records)
    }
}
