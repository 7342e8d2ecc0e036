use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::PointsOrder;
use crate::services::leaderboard::Standing;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardResponse {
    pub category_id: Uuid,
    pub points_order: PointsOrder,
    pub standings: Vec<Standing>,
}
