//! Lineup endpoints
//!
//! DJ and promo slots of one event. Every mutation answers with the
//! resulting lineup so clients never have to re-fetch after a move.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use shizu_common::db::models::EventDj;

use crate::lineup::{DjSlotPatch, NewDjSlot};
use crate::{error::ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub index_a: usize,
    pub index_b: usize,
}

#[derive(Debug, Deserialize)]
pub struct AddPromoRequest {
    pub promo: String,
}

pub async fn list_djs(
    State(state): State<AppState>,
    Path(event): Path<String>,
) -> ApiResult<Json<Vec<EventDj>>> {
    Ok(Json(state.lineup.dj_slots(&event).await?))
}

/// POST /api/events/:name/djs, appends at the end
pub async fn append_dj(
    State(state): State<AppState>,
    Path(event): Path<String>,
    Json(slot): Json<NewDjSlot>,
) -> ApiResult<(StatusCode, Json<EventDj>)> {
    let record = state.lineup.append_dj(&event, &slot).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/events/:name/djs, replaces the whole lineup in the given order
pub async fn replace_djs(
    State(state): State<AppState>,
    Path(event): Path<String>,
    Json(desired): Json<Vec<NewDjSlot>>,
) -> ApiResult<Json<Vec<EventDj>>> {
    Ok(Json(state.lineup.replace_djs(&event, &desired).await?))
}

pub async fn update_dj(
    State(state): State<AppState>,
    Path((event, dj)): Path<(String, String)>,
    Json(patch): Json<DjSlotPatch>,
) -> ApiResult<Json<EventDj>> {
    Ok(Json(state.lineup.update_dj(&event, &dj, &patch).await?))
}

pub async fn remove_dj(
    State(state): State<AppState>,
    Path((event, dj)): Path<(String, String)>,
) -> ApiResult<Json<Vec<EventDj>>> {
    Ok(Json(state.lineup.remove_dj(&event, &dj).await?))
}

pub async fn move_dj(
    State(state): State<AppState>,
    Path(event): Path<String>,
    Json(request): Json<MoveRequest>,
) -> ApiResult<Json<Vec<EventDj>>> {
    let slots = state
        .lineup
        .move_dj(&event, request.index_a, request.index_b)
        .await?;
    Ok(Json(slots))
}

pub async fn list_promos(
    State(state): State<AppState>,
    Path(event): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.lineup.promo_slots(&event).await?))
}

pub async fn append_promo(
    State(state): State<AppState>,
    Path(event): Path<String>,
    Json(request): Json<AddPromoRequest>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.lineup.append_promo(&event, &request.promo).await?))
}

pub async fn replace_promos(
    State(state): State<AppState>,
    Path(event): Path<String>,
    Json(desired): Json<Vec<String>>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.lineup.replace_promos(&event, &desired).await?))
}

pub async fn remove_promo(
    State(state): State<AppState>,
    Path((event, promo)): Path<(String, String)>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.lineup.remove_promo(&event, &promo).await?))
}

pub async fn move_promo(
    State(state): State<AppState>,
    Path(event): Path<String>,
    Json(request): Json<MoveRequest>,
) -> ApiResult<Json<Vec<String>>> {
    let promos = state
        .lineup
        .move_promo(&event, request.index_a, request.index_b)
        .await?;
    Ok(Json(promos))
}

pub fn lineup_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/events/:name/djs",
            get(list_djs).post(append_dj).put(replace_djs),
        )
        .route("/api/events/:name/djs/move", post(move_dj))
        .route(
            "/api/events/:name/djs/:dj",
            put(update_dj).delete(remove_dj),
        )
        .route(
            "/api/events/:name/promos",
            get(list_promos).post(append_promo).put(replace_promos),
        )
        .route("/api/events/:name/promos/move", post(move_promo))
        .route(
            "/api/events/:name/promos/:promo",
            axum::routing::delete(remove_promo),
        )
}
