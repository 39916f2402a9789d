//! File catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shizu_common::db::models::File;

use crate::catalog::files::{self, FilePatch};
use crate::{error::ApiResult, AppState};

/// GET /api/files
pub async fn list_files(State(state): State<AppState>) -> ApiResult<Json<Vec<File>>> {
    Ok(Json(files::list_files(&state.db).await?))
}

/// POST /api/files
pub async fn create_file(
    State(state): State<AppState>,
    Json(file): Json<File>,
) -> ApiResult<(StatusCode, Json<File>)> {
    files::create_file(&state.db, &file).await?;
    Ok((StatusCode::CREATED, Json(file)))
}

/// GET /api/files/:name
pub async fn get_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<File>> {
    Ok(Json(files::get_file(&state.db, &name).await?))
}

/// PUT /api/files/:name
pub async fn update_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(patch): Json<FilePatch>,
) -> ApiResult<Json<File>> {
    Ok(Json(files::update_file(&state.db, &name, patch).await?))
}

/// DELETE /api/files/:name
///
/// References to the file are cleared, not deleted.
pub async fn delete_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    files::delete_file(&state.db, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/api/files", get(list_files).post(create_file))
        .route(
            "/api/files/:name",
            get(get_file).put(update_file).delete(delete_file),
        )
}
