use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// An individual or a team competing in one category.
///
/// `created_at` is the tie-break of last resort on the leaderboard and the
/// seeding order before any result exists.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Entrant {
    pub entrant_id: Uuid,
    pub category_id: Uuid,
    pub display_name: String,
    pub created_at: chrono::NaiveDateTime,
}
