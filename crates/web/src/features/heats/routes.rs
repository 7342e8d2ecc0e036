use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{list_event_heats, schedule_event, schedule_next_event};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/:category_id/heats/next", post(schedule_next_event))
        .route(
            "/:category_id/events/:event_id/heats",
            get(list_event_heats).post(schedule_event),
        )
}
