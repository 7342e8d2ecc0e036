use axum::{Router, routing::get};

use super::handlers::{get_scoring_scheme, update_scoring_scheme};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/:category_id/scoring-scheme",
        get(get_scoring_scheme).put(update_scoring_scheme),
    )
}
