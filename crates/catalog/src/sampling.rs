//! Random title sampling from the canonical catalog or the local corpus

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::aggregator::{CanonicalDetail, ProviderGateway};
use crate::config::SamplingConfig;
use crate::normalizer::{from_canonical_detail, is_available, FinalRecord};
use crate::repository::RecordStore;
use crate::{CatalogError, Result};

/// Title OMDb reports for merged duplicate entries
const DUPLICATE_TITLE: &str = "#DUPE#";

/// Whether a canonical detail is a miss rather than a real title
pub fn is_placeholder(detail: &CanonicalDetail) -> bool {
    let title = detail.title.as_deref().unwrap_or_default();
    !detail.response || !is_available(title) || title.trim() == DUPLICATE_TITLE
}

/// Draws uniformly random titles
pub struct SamplingService {
    gateway: Arc<dyn ProviderGateway>,
    store: Arc<dyn RecordStore>,
    config: SamplingConfig,
}

impl SamplingService {
    pub fn new(
        gateway: Arc<dyn ProviderGateway>,
        store: Arc<dyn RecordStore>,
        config: SamplingConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            config,
        }
    }

    /// Uniformly random ID from `tt0000001` up to the configured bound
    pub fn draw_canonical_id(&self) -> String {
        let number = rand::thread_rng().gen_range(1..=self.config.id_upper_bound);
        format!(
            "{}{:0width$}",
            self.config.id_prefix,
            number,
            width = self.config.id_width
        )
    }

    /// Random title straight from the canonical catalog
    ///
    /// Placeholder results are redrawn up to `max_attempts` times in total.
    /// An empty first response is `NotFound`, as is running out of attempts.
    pub async fn sample_random_external(&self) -> Result<FinalRecord> {
        debug!("Searching random title in canonical catalog");

        let first_id = self.draw_canonical_id();
        let mut detail = self
            .gateway
            .detail_by_canonical_id(&first_id)
            .await?
            .ok_or_else(|| {
                CatalogError::NotFound(format!("canonical catalog returned nothing for {}", first_id))
            })?;

        let mut attempts = 1;
        while is_placeholder(&detail) {
            if attempts >= self.config.max_attempts {
                return Err(CatalogError::NotFound(format!(
                    "no valid sample found after {} attempts",
                    attempts
                )));
            }
            attempts += 1;

            let id = self.draw_canonical_id();
            debug!(imdb_id = %id, attempt = attempts, "Placeholder drawn, retrying");
            detail = self
                .gateway
                .detail_by_canonical_id(&id)
                .await?
                .unwrap_or_default();
        }

        debug!(attempts, "Random title found");
        Ok(from_canonical_detail(&detail))
    }

    /// Random title from the local final records
    ///
    /// Loads the whole corpus per call.
    pub async fn sample_random_local(&self) -> Result<FinalRecord> {
        debug!("Searching random title in local catalog");

        let mut records = self.store.find_all_final().await?;
        if records.is_empty() {
            return Err(CatalogError::NotFound(
                "the local catalog is empty".to_string(),
            ));
        }

        let index = rand::thread_rng().gen_range(0..records.len());
        Ok(records.swap_remove(index))
    }
}
