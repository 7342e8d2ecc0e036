use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::services::leaderboard::Standing;
use crate::services::ranking::ResultWarning;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventSummary {
    pub event_id: Uuid,
    pub ordinal: i32,
    pub ranked: usize,
    pub unranked: usize,
}

/// Outcome of recomputing one category.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecomputeReport {
    pub category_id: Uuid,
    /// Set when the category had no scheme yet and the default one was stored.
    pub default_scheme_created: bool,
    pub events: Vec<EventSummary>,
    pub warnings: Vec<ResultWarning>,
    pub standings: Vec<Standing>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryFailure {
    pub category_id: Uuid,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChampionshipRecomputeReport {
    pub championship_id: Uuid,
    pub categories: Vec<RecomputeReport>,
    pub failures: Vec<CategoryFailure>,
}
