use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::dto::{leaderboard::LeaderboardResponse, recompute::RecomputeReport};
use uuid::Uuid;

use super::services;
use crate::error::WebError;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/categories/{category_id}/recompute",
    params(
        ("category_id" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Every event of the category re-ranked; fresh standings", body = RecomputeReport),
        (status = 404, description = "Category not found"),
        (status = 422, description = "Stored scoring configuration is invalid")
    ),
    tag = "standings"
)]
pub async fn recompute_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let report = state.coordinator.recompute(category_id).await?;

    Ok(Json(RecomputeReport::clone(&report)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/categories/{category_id}/leaderboard",
    params(
        ("category_id" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Current standings", body = LeaderboardResponse),
        (status = 404, description = "Category not found")
    ),
    tag = "standings"
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let leaderboard = services::get_leaderboard(state.store.as_ref(), category_id).await?;

    Ok(Json(leaderboard).into_response())
}
