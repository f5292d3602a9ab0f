//! HTTP-backed provider gateway combining TMDb and OMDb

use super::{
    omdb, tmdb, CanonicalDetail, CanonicalLookup, OmdbClient, ProviderGateway, SearchHit,
    TitleDetail, TmdbClient, Trailer, TranslatedPlot,
};
use crate::config::CatalogConfig;
use crate::normalizer::MediaType;
use crate::rate_limit::RateLimitManager;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Provider gateway that throttles each catalog before calling it
pub struct HttpProviderGateway {
    tmdb: TmdbClient,
    omdb: OmdbClient,
    rate_limiter: Arc<RateLimitManager>,
}

impl HttpProviderGateway {
    pub fn new(tmdb: TmdbClient, omdb: OmdbClient, rate_limiter: Arc<RateLimitManager>) -> Self {
        Self {
            tmdb,
            omdb,
            rate_limiter,
        }
    }

    /// Build both clients and register their quotas from configuration
    pub async fn from_config(config: &CatalogConfig) -> Result<Self> {
        let rate_limiter = Arc::new(RateLimitManager::new());
        rate_limiter
            .register_provider(
                tmdb::PROVIDER,
                config.tmdb.requests_per_window,
                config.tmdb.window(),
            )
            .await?;
        rate_limiter
            .register_provider(
                omdb::PROVIDER,
                config.omdb.requests_per_window,
                config.omdb.window(),
            )
            .await?;

        Ok(Self::new(
            TmdbClient::from_config(&config.tmdb, &config.cache),
            OmdbClient::from_config(&config.omdb, &config.cache),
            rate_limiter,
        ))
    }
}

#[async_trait]
impl ProviderGateway for HttpProviderGateway {
    async fn search_titles(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.rate_limiter.check_and_wait(tmdb::PROVIDER).await;
        self.tmdb.search_multi(query).await
    }

    async fn movie_detail(&self, id: &str) -> Result<TitleDetail> {
        self.rate_limiter.check_and_wait(tmdb::PROVIDER).await;
        self.tmdb.get_movie_details(id).await
    }

    async fn series_detail(&self, id: &str) -> Result<TitleDetail> {
        self.rate_limiter.check_and_wait(tmdb::PROVIDER).await;
        self.tmdb.get_tv_details(id).await
    }

    async fn movie_trailers(&self, id: &str) -> Result<Vec<Trailer>> {
        self.rate_limiter.check_and_wait(tmdb::PROVIDER).await;
        self.tmdb.get_videos(MediaType::Movie, id).await
    }

    async fn series_trailers(&self, id: &str) -> Result<Vec<Trailer>> {
        self.rate_limiter.check_and_wait(tmdb::PROVIDER).await;
        self.tmdb.get_videos(MediaType::Series, id).await
    }

    async fn lookup_canonical_id_by_name(&self, name: &str) -> Result<CanonicalLookup> {
        self.rate_limiter.check_and_wait(omdb::PROVIDER).await;
        self.omdb.search_by_name(name).await
    }

    async fn detail_by_canonical_id(&self, imdb_id: &str) -> Result<Option<CanonicalDetail>> {
        self.rate_limiter.check_and_wait(omdb::PROVIDER).await;
        self.omdb.get_by_imdb_id(imdb_id).await
    }

    async fn translated_plot(
        &self,
        rich_id: &str,
        media_type: MediaType,
    ) -> Result<TranslatedPlot> {
        self.rate_limiter.check_and_wait(tmdb::PROVIDER).await;
        self.tmdb.get_translation(media_type, rich_id).await
    }
}
