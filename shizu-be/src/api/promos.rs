//! Promo endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shizu_common::db::models::Promo;

use crate::catalog::promos::{self, PromoPatch};
use crate::{error::ApiResult, AppState};

pub async fn list_promos(State(state): State<AppState>) -> ApiResult<Json<Vec<Promo>>> {
    Ok(Json(promos::list_promos(&state.db).await?))
}

pub async fn create_promo(
    State(state): State<AppState>,
    Json(promo): Json<Promo>,
) -> ApiResult<(StatusCode, Json<Promo>)> {
    promos::create_promo(&state.db, &promo).await?;
    Ok((StatusCode::CREATED, Json(promo)))
}

pub async fn get_promo(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Promo>> {
    Ok(Json(promos::get_promo(&state.db, &name).await?))
}

pub async fn update_promo(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(patch): Json<PromoPatch>,
) -> ApiResult<Json<Promo>> {
    Ok(Json(promos::update_promo(&state.db, &name, patch).await?))
}

/// DELETE /api/promos/:name; also drops it from every event's promo lineup
pub async fn delete_promo(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    promos::delete_promo(&state.db, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn promo_routes() -> Router<AppState> {
    Router::new()
        .route("/api/promos", get(list_promos).post(create_promo))
        .route(
            "/api/promos/:name",
            get(get_promo).put(update_promo).delete(delete_promo),
        )
}
