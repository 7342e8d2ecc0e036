use chrono::Duration;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::day_schedule::non_negative_minutes;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    ElapsedTime,
    RepetitionCount,
    Load,
}

impl ResultType {
    pub fn lower_is_better(&self) -> bool {
        matches!(self, Self::ElapsedTime)
    }
}

text_enum!(ResultType, "result type", {
    ElapsedTime => "elapsed_time",
    RepetitionCount => "repetition_count",
    Load => "load",
});

/// One judged workout (WOD) of a championship.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Event {
    pub event_id: Uuid,
    pub championship_id: Uuid,
    pub name: String,
    /// 1-based position within the championship.
    pub ordinal: i32,
    pub result_type: ResultType,
    pub day_number: i32,
    /// Expected heat duration; an unset cap contributes nothing to the timetable.
    pub time_cap_minutes: Option<i32>,
}

impl Event {
    pub fn heat_duration(&self) -> Result<Duration> {
        non_negative_minutes(self.time_cap_minutes.unwrap_or(0), "time cap")
    }
}
