use storage::{
    CompetitionStore, dto::leaderboard::LeaderboardResponse, error::Result,
    services::pipeline,
};
use uuid::Uuid;

/// Standings of a category, derived from its stored results
pub async fn get_leaderboard(
    store: &dyn CompetitionStore,
    category_id: Uuid,
) -> Result<LeaderboardResponse> {
    pipeline::leaderboard(store, category_id).await
}
