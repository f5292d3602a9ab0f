//! Per-provider request throttling

use crate::{CatalogError, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Jitter, Quota, RateLimiter};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limit manager for the catalog providers
pub struct RateLimitManager {
    limiters: Arc<RwLock<HashMap<String, Arc<DirectLimiter>>>>,
}

impl RateLimitManager {
    pub fn new() -> Self {
        Self {
            limiters: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a provider quota of `max_requests` per `window`
    pub async fn register_provider(
        &self,
        provider: &str,
        max_requests: u32,
        window: Duration,
    ) -> Result<()> {
        let burst = NonZeroU32::new(max_requests).ok_or_else(|| {
            CatalogError::ConfigError(format!("{} quota must allow at least one request", provider))
        })?;
        let period = window / max_requests;
        let quota = Quota::with_period(period)
            .ok_or_else(|| {
                CatalogError::ConfigError(format!("{} quota window must be non-zero", provider))
            })?
            .allow_burst(burst);

        self.limiters
            .write()
            .await
            .insert(provider.to_string(), Arc::new(RateLimiter::direct(quota)));

        debug!(
            provider = %provider,
            max_requests,
            window = ?window,
            "Registered rate limiter"
        );
        Ok(())
    }

    /// Wait until the provider has capacity for one more request
    ///
    /// Providers without a registered quota pass through unthrottled.
    pub async fn check_and_wait(&self, provider: &str) {
        let limiter = self.limiters.read().await.get(provider).cloned();

        match limiter {
            Some(limiter) => {
                limiter
                    .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(50)))
                    .await
            }
            None => warn!(provider = %provider, "No rate limiter configured"),
        }
    }

    pub async fn is_registered(&self, provider: &str) -> bool {
        self.limiters.read().await.contains_key(provider)
    }
}

impl Default for RateLimitManager {
    fn default() -> Self {
        Self::new()
    }
}
