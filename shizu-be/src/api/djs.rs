//! DJ endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shizu_common::db::models::Dj;

use crate::catalog::djs::{self, DjPatch};
use crate::{error::ApiResult, AppState};

pub async fn list_djs(State(state): State<AppState>) -> ApiResult<Json<Vec<Dj>>> {
    Ok(Json(djs::list_djs(&state.db).await?))
}

pub async fn create_dj(
    State(state): State<AppState>,
    Json(dj): Json<Dj>,
) -> ApiResult<(StatusCode, Json<Dj>)> {
    djs::create_dj(&state.db, &dj).await?;
    Ok((StatusCode::CREATED, Json(dj)))
}

pub async fn get_dj(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<Json<Dj>> {
    Ok(Json(djs::get_dj(&state.db, &name).await?))
}

pub async fn update_dj(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(patch): Json<DjPatch>,
) -> ApiResult<Json<Dj>> {
    Ok(Json(djs::update_dj(&state.db, &name, patch).await?))
}

/// DELETE /api/djs/:name; removes the DJ from every lineup first
pub async fn delete_dj(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    djs::delete_dj(&state.db, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn dj_routes() -> Router<AppState> {
    Router::new()
        .route("/api/djs", get(list_djs).post(create_dj))
        .route(
            "/api/djs/:name",
            get(get_dj).put(update_dj).delete(delete_dj),
        )
}
