use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::dto::{heat::TimetableResponse, recompute::ChampionshipRecomputeReport};
use uuid::Uuid;

use super::services;
use crate::error::WebError;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/championships/{championship_id}/recompute",
    params(
        ("championship_id" = Uuid, Path, description = "Championship id")
    ),
    responses(
        (status = 200, description = "Per-category reports; failed categories are listed separately", body = ChampionshipRecomputeReport),
        (status = 404, description = "Championship not found")
    ),
    tag = "championships"
)]
pub async fn recompute_championship(
    State(state): State<AppState>,
    Path(championship_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let report = services::recompute_championship(
        state.store.as_ref(),
        &state.coordinator,
        championship_id,
    )
    .await?;

    Ok(Json(report).into_response())
}

#[utoipa::path(
    post,
    path = "/api/championships/{championship_id}/timetable",
    params(
        ("championship_id" = Uuid, Path, description = "Championship id")
    ),
    responses(
        (status = 200, description = "Start times written for every heat", body = TimetableResponse),
        (status = 404, description = "Championship not found"),
        (status = 422, description = "Day schedule missing or invalid")
    ),
    tag = "championships"
)]
pub async fn rebuild_timetable(
    State(state): State<AppState>,
    Path(championship_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let timetable = services::rebuild_timetable(state.store.as_ref(), championship_id).await?;

    Ok(Json(timetable).into_response())
}
