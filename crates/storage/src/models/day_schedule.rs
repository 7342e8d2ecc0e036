use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, StorageError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BreakWindow {
    pub enabled: bool,
    pub duration_minutes: i32,
    /// The break starts once every heat of the event with this ordinal is done.
    pub after_event_ordinal: i32,
}

/// Timetable settings of one competition day.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DaySchedule {
    pub championship_id: Uuid,
    pub day_number: i32,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "08:00:00")]
    pub start_time: NaiveTime,
    /// Gap between the end of a heat and the start of the next heat of the same event and category.
    pub heat_interval_minutes: i32,
    pub break_window: BreakWindow,
}

impl DaySchedule {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start_time)
    }

    pub fn heat_interval(&self) -> Result<Duration> {
        non_negative_minutes(self.heat_interval_minutes, "heat interval")
    }

    /// Break to insert between the event with `previous` ordinal and the one
    /// with `next`. Applies whenever the break's event ordinal lies in
    /// `previous..next`, so it is kept even if its own event has no heats.
    pub fn break_between(&self, previous: i32, next: i32) -> Result<Option<Duration>> {
        let after = self.break_window.after_event_ordinal;
        if !self.break_window.enabled || !(previous..next).contains(&after) {
            return Ok(None);
        }
        non_negative_minutes(self.break_window.duration_minutes, "break duration").map(Some)
    }
}

pub(crate) fn non_negative_minutes(minutes: i32, what: &str) -> Result<Duration> {
    if minutes < 0 {
        return Err(StorageError::InvalidConfiguration(format!(
            "{} must not be negative, got {} minutes",
            what, minutes
        )));
    }
    Ok(Duration::minutes(i64::from(minutes)))
}
