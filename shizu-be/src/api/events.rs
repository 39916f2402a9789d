//! Event endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use shizu_common::db::models::Event;

use crate::catalog::events::{self, EventPatch, EventView, NewEvent};
use crate::{error::ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SetThemeRequest {
    #[serde(default)]
    pub theme: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetDateTimeRequest {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
}

/// GET /api/events, most recent first
pub async fn list_events(State(state): State<AppState>) -> ApiResult<Json<Vec<Event>>> {
    Ok(Json(events::list_events(&state.db).await?))
}

/// POST /api/events
///
/// The optional `djs` and `promos` arrays become the initial lineup.
pub async fn create_event(
    State(state): State<AppState>,
    Json(new): Json<NewEvent>,
) -> ApiResult<(StatusCode, Json<EventView>)> {
    let created = events::create_event(&state.db, new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<EventView>> {
    Ok(Json(events::get_event(&state.db, &name).await?))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(patch): Json<EventPatch>,
) -> ApiResult<Json<EventView>> {
    Ok(Json(events::update_event(&state.db, &name, patch).await?))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    events::delete_event(&state.db, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/events/:name/theme, `{"theme": null}` clears it
pub async fn set_theme(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<SetThemeRequest>,
) -> ApiResult<Json<EventView>> {
    Ok(Json(events::set_theme(&state.db, &name, request.theme).await?))
}

/// PUT /api/events/:name/date-time
pub async fn set_date_time(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<SetDateTimeRequest>,
) -> ApiResult<Json<EventView>> {
    let view = events::set_date_time(&state.db, &name, request.date, request.start_time).await?;
    Ok(Json(view))
}

pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events).post(create_event))
        .route(
            "/api/events/:name",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/api/events/:name/theme", put(set_theme))
        .route("/api/events/:name/date-time", put(set_date_time))
}
