use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{
    Category, Championship, DaySchedule, Entrant, Event, EventResult, Heat, HeatStart, NewHeat,
    ResultScore, ScoringScheme,
};

pub mod category;
pub mod championship;
pub mod heat;
pub mod memory;
pub mod postgres;
pub mod result;

pub use memory::MemoryStore;

/// Reads a value stored in an INTEGER column that must not be negative.
pub(crate) fn unsigned_column(value: i32, column: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        StorageError::ConstraintViolation(format!("{} must not be negative, got {}", column, value))
    })
}

/// Everything the scoring and scheduling pipeline reads and writes.
///
/// Lookups of a single record fail with `StorageError::NotFound`. Every
/// `replace_*`/`set_*` write is all-or-nothing: readers never observe half of
/// a batch.
#[async_trait]
pub trait CompetitionStore: Send + Sync {
    async fn championship(&self, championship_id: Uuid) -> Result<Championship>;

    async fn categories(&self, championship_id: Uuid) -> Result<Vec<Category>>;

    async fn category(&self, category_id: Uuid) -> Result<Category>;

    async fn entrants(&self, category_id: Uuid) -> Result<Vec<Entrant>>;

    /// Events of a championship in ordinal order.
    async fn events(&self, championship_id: Uuid) -> Result<Vec<Event>>;

    async fn event(&self, event_id: Uuid) -> Result<Event>;

    async fn day_schedules(&self, championship_id: Uuid) -> Result<Vec<DaySchedule>>;

    /// Every result row of a category, all events.
    async fn category_results(&self, category_id: Uuid) -> Result<Vec<EventResult>>;

    async fn scoring_scheme(&self, category_id: Uuid) -> Result<Option<ScoringScheme>>;

    async fn save_scoring_scheme(&self, scheme: &ScoringScheme) -> Result<()>;

    /// Writes derived rank and points for every listed result of one event.
    async fn replace_event_scores(
        &self,
        event_id: Uuid,
        category_id: Uuid,
        scores: &[ResultScore],
    ) -> Result<()>;

    /// Heats of one event-category pair with their lanes, by heat number.
    async fn heats(&self, event_id: Uuid, category_id: Uuid) -> Result<Vec<Heat>>;

    async fn championship_heats(&self, championship_id: Uuid) -> Result<Vec<Heat>>;

    /// Drops every heat of the pair and stores `heats` in their place.
    ///
    /// Fails with `StorageError::HeatsAlreadyStarted` and leaves the old heats
    /// untouched when one of them has started.
    async fn replace_heats(
        &self,
        event_id: Uuid,
        category_id: Uuid,
        heats: &[NewHeat],
    ) -> Result<Vec<Heat>>;

    async fn set_heat_start_times(&self, starts: &[HeatStart]) -> Result<()>;

    async fn mark_heat_started(&self, heat_id: Uuid, started_at: NaiveDateTime) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_column_rejects_negative_values() {
        assert_eq!(unsigned_column(3, "lane_number").unwrap(), 3);
        assert_eq!(unsigned_column(0, "capacity").unwrap(), 0);
        assert!(matches!(
            unsigned_column(-1, "lane_number"),
            Err(StorageError::ConstraintViolation(msg)) if msg.contains("lane_number")
        ));
    }
}
