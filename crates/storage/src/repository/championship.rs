use chrono::{NaiveDate, NaiveTime};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{BreakWindow, Championship, DaySchedule, Event};

#[derive(FromRow)]
struct EventRow {
    event_id: Uuid,
    championship_id: Uuid,
    name: String,
    ordinal: i32,
    result_type: String,
    day_number: i32,
    time_cap_minutes: Option<i32>,
}

impl TryFrom<EventRow> for Event {
    type Error = StorageError;

    fn try_from(row: EventRow) -> Result<Self> {
        Ok(Self {
            event_id: row.event_id,
            championship_id: row.championship_id,
            name: row.name,
            ordinal: row.ordinal,
            result_type: row.result_type.parse()?,
            day_number: row.day_number,
            time_cap_minutes: row.time_cap_minutes,
        })
    }
}

#[derive(FromRow)]
struct DayScheduleRow {
    championship_id: Uuid,
    day_number: i32,
    date: NaiveDate,
    start_time: NaiveTime,
    heat_interval_minutes: i32,
    break_enabled: bool,
    break_duration_minutes: i32,
    break_after_event_ordinal: i32,
}

impl From<DayScheduleRow> for DaySchedule {
    fn from(row: DayScheduleRow) -> Self {
        Self {
            championship_id: row.championship_id,
            day_number: row.day_number,
            date: row.date,
            start_time: row.start_time,
            heat_interval_minutes: row.heat_interval_minutes,
            break_window: BreakWindow {
                enabled: row.break_enabled,
                duration_minutes: row.break_duration_minutes,
                after_event_ordinal: row.break_after_event_ordinal,
            },
        }
    }
}

pub struct ChampionshipRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ChampionshipRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, championship_id: Uuid) -> Result<Championship> {
        sqlx::query_as::<_, Championship>(
            r#"
            SELECT championship_id, name, category_transition_minutes,
                   event_transition_minutes, created_at
            FROM championships
            WHERE championship_id = $1
            "#,
        )
        .bind(championship_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Events in ordinal order.
    pub async fn list_events(&self, championship_id: Uuid) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT event_id, championship_id, name, ordinal, result_type,
                   day_number, time_cap_minutes
            FROM events
            WHERE championship_id = $1
            ORDER BY ordinal, event_id
            "#,
        )
        .bind(championship_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Event::try_from).collect()
    }

    pub async fn find_event(&self, event_id: Uuid) -> Result<Event> {
        let row = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT event_id, championship_id, name, ordinal, result_type,
                   day_number, time_cap_minutes
            FROM events
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Event::try_from(row)
    }

    pub async fn list_day_schedules(&self, championship_id: Uuid) -> Result<Vec<DaySchedule>> {
        let rows = sqlx::query_as::<_, DayScheduleRow>(
            r#"
            SELECT championship_id, day_number, date, start_time, heat_interval_minutes,
                   break_enabled, break_duration_minutes, break_after_event_ordinal
            FROM day_schedules
            WHERE championship_id = $1
            ORDER BY day_number
            "#,
        )
        .bind(championship_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(DaySchedule::from).collect())
    }
}
