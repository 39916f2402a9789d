//! shizu-be library - event production backend
//!
//! Catalog of media files, themes, promos, DJs and events; ordered lineup
//! editing; export of an event to the playout tool's JSON document; import
//! of the legacy ledger and lineup files.

use axum::Router;
use shizu_common::config::{MediaRoots, TomlConfig};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod catalog;
pub mod error;
pub mod export;
pub mod import;
pub mod lineup;
pub mod patch;
pub mod validate;

use export::{ExportAssembler, FfprobeProbe, HttpFetcher};
use import::LegacyImporter;
use lineup::LineupManager;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub lineup: LineupManager,
    pub exporter: Arc<ExportAssembler>,
    pub importer: LegacyImporter,
    pub config: Arc<TomlConfig>,
}

impl AppState {
    /// State wired to the production probe and fetcher
    pub fn new(db: SqlitePool, roots: MediaRoots, config: TomlConfig) -> Self {
        let fetcher = HttpFetcher::new(
            config.download.authorization.as_deref(),
            config.download.timeout_secs,
        );
        let exporter = ExportAssembler::new(
            db.clone(),
            roots.clone(),
            config.stream.rtmp_template.clone(),
            Arc::new(FfprobeProbe::default()),
            Arc::new(fetcher),
        );
        Self::with_exporter(db, roots, config, exporter)
    }

    pub fn with_exporter(
        db: SqlitePool,
        roots: MediaRoots,
        config: TomlConfig,
        exporter: ExportAssembler,
    ) -> Self {
        Self {
            lineup: LineupManager::new(db.clone()),
            importer: LegacyImporter::new(db.clone(), roots),
            exporter: Arc::new(exporter),
            config: Arc::new(config),
            db,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::buildinfo_routes())
        .merge(api::health_routes())
        .merge(api::settings_routes())
        .merge(api::file_routes())
        .merge(api::theme_routes())
        .merge(api::promo_routes())
        .merge(api::dj_routes())
        .merge(api::event_routes())
        .merge(api::lineup_routes())
        .merge(api::export_routes())
        .merge(api::import_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
