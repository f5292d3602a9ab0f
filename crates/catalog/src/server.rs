//! HTTP routes for the catalog service

use actix_web::{http::StatusCode, web, HttpResponse, Responder, ResponseError};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use crate::reconciliation::{FieldFilters, ReconciliationEngine};
use crate::sampling::SamplingService;
use crate::CatalogError;

/// Shared handler state
pub struct AppState {
    pub engine: Arc<ReconciliationEngine>,
    pub sampler: Arc<SamplingService>,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub title: String,
}

impl ResponseError for CatalogError {
    fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::UpstreamUnavailable { .. } | CatalogError::HttpError(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (code, description) = match self {
            CatalogError::NotFound(_) => ("not_found", "No results found"),
            CatalogError::UpstreamUnavailable { .. } | CatalogError::HttpError(_) => {
                error!(error = %self, "Upstream provider request failed");
                ("upstream_unavailable", "An upstream catalog provider is unavailable")
            }
            _ => {
                error!(error = %self, "Request failed");
                ("internal_error", "Internal server error")
            }
        };

        HttpResponse::build(self.status_code()).json(json!({
            "error": code,
            "error_description": description
        }))
    }
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "catalog-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn search_titles(
    state: web::Data<AppState>,
    query: web::Query<TitleQuery>,
) -> Result<HttpResponse, CatalogError> {
    let records = state.engine.reconcile_title(&query.title).await?;
    Ok(HttpResponse::Ok().json(records))
}

async fn suggest_titles(
    state: web::Data<AppState>,
    query: web::Query<TitleQuery>,
) -> Result<HttpResponse, CatalogError> {
    let titles = state.engine.suggest_titles(&query.title).await?;
    Ok(HttpResponse::Ok().json(titles))
}

async fn filter_titles(
    state: web::Data<AppState>,
    filters: web::Query<FieldFilters>,
) -> Result<HttpResponse, CatalogError> {
    let records = state.engine.filter_by_fields(&filters).await?;
    Ok(HttpResponse::Ok().json(records))
}

async fn random_external(state: web::Data<AppState>) -> Result<HttpResponse, CatalogError> {
    let record = state.sampler.sample_random_external().await?;
    Ok(HttpResponse::Ok().json(record))
}

async fn random_local(state: web::Data<AppState>) -> Result<HttpResponse, CatalogError> {
    let record = state.sampler.sample_random_local().await?;
    Ok(HttpResponse::Ok().json(record))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check)).service(
        web::scope("/api/v1/titles")
            .route("/search", web::get().to(search_titles))
            .route("/suggest", web::get().to(suggest_titles))
            .route("/filter", web::get().to(filter_titles))
            .route("/random/external", web::get().to(random_external))
            .route("/random/local", web::get().to(random_local)),
    );
}
