use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::dto::{
    recompute::RecomputeReport,
    scoring::{ScoringSchemeResponse, ScoringSchemeUpdateResponse, UpdateScoringSchemeRequest},
};
use uuid::Uuid;
use validator::Validate;

use super::services;
use crate::error::WebError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/categories/{category_id}/scoring-scheme",
    params(
        ("category_id" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Scoring scheme of the category, or the default one", body = ScoringSchemeResponse),
        (status = 404, description = "Category not found")
    ),
    tag = "scoring"
)]
pub async fn get_scoring_scheme(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let scheme = services::get_scoring_scheme(state.store.as_ref(), category_id).await?;

    Ok(Json(scheme).into_response())
}

#[utoipa::path(
    put,
    path = "/api/categories/{category_id}/scoring-scheme",
    params(
        ("category_id" = Uuid, Path, description = "Category id")
    ),
    request_body = UpdateScoringSchemeRequest,
    responses(
        (status = 200, description = "Scheme saved and every event re-scored", body = ScoringSchemeUpdateResponse),
        (status = 400, description = "Invalid request data"),
        (status = 404, description = "Category not found"),
        (status = 422, description = "Points table is invalid")
    ),
    tag = "scoring"
)]
pub async fn update_scoring_scheme(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<UpdateScoringSchemeRequest>,
) -> Result<Response, WebError> {
    payload.validate()?;

    let scheme = services::store_scoring_scheme(state.store.as_ref(), category_id, payload).await?;
    let report = state.coordinator.recompute(category_id).await?;

    Ok(Json(ScoringSchemeUpdateResponse {
        scheme: ScoringSchemeResponse::new(scheme, true),
        recompute: RecomputeReport::clone(&report),
    })
    .into_response())
}
