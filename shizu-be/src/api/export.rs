//! Export endpoint

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};

use crate::export::ExportDocument;
use crate::{error::ApiResult, AppState};

/// POST /api/events/:name/export
///
/// Blocks until every remote file is downloaded and probed; the written
/// document is returned as the response body.
pub async fn export_event(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<ExportDocument>> {
    Ok(Json(state.exporter.export_event(&name).await?))
}

pub fn export_routes() -> Router<AppState> {
    Router::new().route("/api/events/:name/export", post(export_event))
}
