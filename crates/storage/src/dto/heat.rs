use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Heat, HeatAssignment};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HeatResponse {
    pub heat_id: Uuid,
    pub heat_number: u32,
    pub capacity: u32,
    pub scheduled_at: Option<NaiveDateTime>,
    pub started_at: Option<NaiveDateTime>,
    pub lanes: Vec<HeatAssignment>,
}

impl From<Heat> for HeatResponse {
    fn from(heat: Heat) -> Self {
        Self {
            heat_id: heat.heat_id,
            heat_number: heat.heat_number,
            capacity: heat.capacity,
            scheduled_at: heat.scheduled_at,
            started_at: heat.started_at,
            lanes: heat.assignments,
        }
    }
}

/// Heats of one event for one category.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventHeatsResponse {
    pub event_id: Uuid,
    pub category_id: Uuid,
    pub heats: Vec<HeatResponse>,
}

impl EventHeatsResponse {
    pub fn new(event_id: Uuid, category_id: Uuid, heats: Vec<Heat>) -> Self {
        Self {
            event_id,
            category_id,
            heats: heats.into_iter().map(HeatResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimetableResponse {
    pub championship_id: Uuid,
    pub scheduled_heats: usize,
    pub first_start: Option<NaiveDateTime>,
    pub last_start: Option<NaiveDateTime>,
}
