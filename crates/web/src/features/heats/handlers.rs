use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::dto::heat::EventHeatsResponse;
use uuid::Uuid;

use super::services;
use crate::error::WebError;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/categories/{category_id}/heats/next",
    params(
        ("category_id" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 201, description = "Heats of the first event without heats", body = EventHeatsResponse),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Event already started"),
        (status = 422, description = "Every event already has heats, or the heat capacity is invalid")
    ),
    tag = "heats"
)]
pub async fn schedule_next_event(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<Response, WebError> {
    let heats = services::schedule_next_event(state.store.as_ref(), category_id).await?;

    Ok((StatusCode::CREATED, Json(heats)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/categories/{category_id}/events/{event_id}/heats",
    params(
        ("category_id" = Uuid, Path, description = "Category id"),
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    responses(
        (status = 201, description = "Heats replaced from current standings", body = EventHeatsResponse),
        (status = 404, description = "Category or event not found"),
        (status = 409, description = "Event already started, or belongs to another championship"),
        (status = 422, description = "Heat capacity is invalid")
    ),
    tag = "heats"
)]
pub async fn schedule_event(
    State(state): State<AppState>,
    Path((category_id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, WebError> {
    let heats = services::schedule_event(state.store.as_ref(), category_id, event_id).await?;

    Ok((StatusCode::CREATED, Json(heats)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/categories/{category_id}/events/{event_id}/heats",
    params(
        ("category_id" = Uuid, Path, description = "Category id"),
        ("event_id" = Uuid, Path, description = "Event id")
    ),
    responses(
        (status = 200, description = "Heats with lane assignments", body = EventHeatsResponse),
        (status = 404, description = "Category or event not found")
    ),
    tag = "heats"
)]
pub async fn list_event_heats(
    State(state): State<AppState>,
    Path((category_id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, WebError> {
    let heats = services::list_event_heats(state.store.as_ref(), category_id, event_id).await?;

    Ok(Json(heats).into_response())
}
