//! vtel-vd library - Vehicle Data service
//!
//! Ingests per-vehicle CSV source files into SQLite and serves the samples
//! over HTTP: paginated queries, single lookups and file exports.

use std::path::PathBuf;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod pagination;
pub mod query;
pub mod store;

use export::ExportService;
use ingest::IngestionPipeline;
use query::QueryService;
use store::RecordStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
    pub ingestion: IngestionPipeline,
    pub queries: QueryService,
    pub exports: ExportService,
}

impl AppState {
    /// Wire every service onto one store
    pub fn new(
        store: RecordStore,
        data_dir: impl Into<PathBuf>,
        exports_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ingestion: IngestionPipeline::new(store.clone(), data_dir),
            queries: QueryService::new(store.clone()),
            exports: ExportService::new(store.clone(), exports_dir),
            store,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::vehicle_data_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
