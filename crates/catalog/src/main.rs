//! Catalog Service - Title Reconciliation
//!
//! Port: 8086 (configurable)

use actix_web::{web, App, HttpServer};
use media_catalog::server::{configure_routes, AppState};
use media_catalog::{
    CatalogConfig, HttpProviderGateway, PostgresRecordStore, ReconciliationEngine,
    SamplingService,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let config = CatalogConfig::load()?;
    config.validate()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_sec))
        .connect(&config.database.url)
        .await?;

    let store = Arc::new(PostgresRecordStore::new(pool));
    store.migrate().await?;

    let gateway = Arc::new(HttpProviderGateway::from_config(&config).await?);

    let engine = Arc::new(ReconciliationEngine::new(gateway.clone(), store.clone()));
    let sampler = Arc::new(SamplingService::new(
        gateway,
        store,
        config.sampling.clone(),
    ));

    let state = web::Data::new(AppState { engine, sampler });
    let bind_addr = (config.server.host.clone(), config.server.port);

    info!("Starting Catalog Service on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
