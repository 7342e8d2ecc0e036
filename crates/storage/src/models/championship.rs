use chrono::Duration;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::day_schedule::non_negative_minutes;
use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Championship {
    pub championship_id: Uuid,
    pub name: String,
    /// Gap before the first heat of the next category inside the same event.
    pub category_transition_minutes: i32,
    /// Gap before the first heat of the next event.
    pub event_transition_minutes: i32,
    pub created_at: chrono::NaiveDateTime,
}

impl Championship {
    pub fn category_transition(&self) -> Result<Duration> {
        non_negative_minutes(self.category_transition_minutes, "category transition")
    }

    pub fn event_transition(&self) -> Result<Duration> {
        non_negative_minutes(self.event_transition_minutes, "event transition")
    }
}
