use axum::{Router, routing::post};

use super::handlers::{rebuild_timetable, recompute_championship};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/:championship_id/recompute", post(recompute_championship))
        .route("/:championship_id/timetable", post(rebuild_timetable))
}
