//! Legacy import endpoints

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub status: String,
}

fn required_path(request: &ImportRequest, what: &str) -> ApiResult<PathBuf> {
    if request.path.trim().is_empty() {
        return Err(ApiError::BadRequest(format!(
            "The path field is required to import {}",
            what
        )));
    }
    Ok(PathBuf::from(&request.path))
}

/// POST /api/import/ledger
pub async fn import_ledger(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> ApiResult<Json<ImportResponse>> {
    let path = required_path(&request, "a ledger")?;
    state.importer.import_ledger(&path).await?;
    Ok(Json(ImportResponse {
        status: "imported".to_string(),
    }))
}

/// POST /api/import/lineups, `path` is a directory of lineup files
pub async fn import_lineups(
    State(state): State<AppState>,
    Json(request): Json<ImportRequest>,
) -> ApiResult<Json<ImportResponse>> {
    let path = required_path(&request, "lineups")?;
    state.importer.import_lineups(&path).await?;
    Ok(Json(ImportResponse {
        status: "imported".to_string(),
    }))
}

pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/api/import/ledger", post(import_ledger))
        .route("/api/import/lineups", post(import_lineups))
}
