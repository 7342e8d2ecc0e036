use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{get_leaderboard, recompute_category};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/:category_id/recompute", post(recompute_category))
        .route("/:category_id/leaderboard", get(get_leaderboard))
}
