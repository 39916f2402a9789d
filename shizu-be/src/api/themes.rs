//! Theme endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shizu_common::db::models::Theme;

use crate::catalog::themes::{self, ThemePatch};
use crate::{error::ApiResult, AppState};

pub async fn list_themes(State(state): State<AppState>) -> ApiResult<Json<Vec<Theme>>> {
    Ok(Json(themes::list_themes(&state.db).await?))
}

pub async fn create_theme(
    State(state): State<AppState>,
    Json(theme): Json<Theme>,
) -> ApiResult<(StatusCode, Json<Theme>)> {
    themes::create_theme(&state.db, &theme).await?;
    Ok((StatusCode::CREATED, Json(theme)))
}

pub async fn get_theme(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Theme>> {
    Ok(Json(themes::get_theme(&state.db, &name).await?))
}

pub async fn update_theme(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(patch): Json<ThemePatch>,
) -> ApiResult<Json<Theme>> {
    Ok(Json(themes::update_theme(&state.db, &name, patch).await?))
}

/// DELETE /api/themes/:name; events using the theme fall back to none
pub async fn delete_theme(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    themes::delete_theme(&state.db, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn theme_routes() -> Router<AppState> {
    Router::new()
        .route("/api/themes", get(list_themes).post(create_theme))
        .route(
            "/api/themes/:name",
            get(get_theme).put(update_theme).delete(delete_theme),
        )
}
