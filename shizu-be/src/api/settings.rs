//! Read-only settings endpoints

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use shizu_common::config::RtmpZone;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct RtmpSettingsResponse {
    pub template: String,
    pub zones: Vec<RtmpZone>,
}

/// GET /api/settings/version
pub async fn get_version() -> Json<VersionResponse> {
    Json(VersionResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/settings/rtmp
///
/// Ingest points DJs can be pointed at, and how live URLs are formed.
pub async fn get_rtmp_settings(State(state): State<AppState>) -> Json<RtmpSettingsResponse> {
    Json(RtmpSettingsResponse {
        template: state.config.stream.rtmp_template.clone(),
        zones: state.config.stream.rtmp_zones.clone(),
    })
}

pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/api/settings/version", get(get_version))
        .route("/api/settings/rtmp", get(get_rtmp_settings))
}
