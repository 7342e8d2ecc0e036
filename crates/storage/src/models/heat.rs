use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HeatAssignment {
    pub entrant_id: Uuid,
    /// Unique within the heat, contiguous from 1.
    pub lane_number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Heat {
    pub heat_id: Uuid,
    pub event_id: Uuid,
    pub category_id: Uuid,
    pub heat_number: u32,
    /// Category capacity at the time the heat was generated.
    pub capacity: u32,
    pub scheduled_at: Option<chrono::NaiveDateTime>,
    pub started_at: Option<chrono::NaiveDateTime>,
    pub assignments: Vec<HeatAssignment>,
}

impl Heat {
    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }
}

/// A heat computed in memory, before the store assigns it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewHeat {
    pub heat_number: u32,
    pub capacity: u32,
    pub assignments: Vec<HeatAssignment>,
}

/// Absolute start time computed for one stored heat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HeatStart {
    pub heat_id: Uuid,
    pub starts_at: chrono::NaiveDateTime,
}
