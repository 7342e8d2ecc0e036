use std::collections::HashMap;

use chrono::NaiveDateTime;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::unsigned_column;
use crate::error::{Result, StorageError};
use crate::models::{Heat, HeatAssignment, HeatStart, NewHeat};

#[derive(FromRow)]
struct HeatRow {
    heat_id: Uuid,
    event_id: Uuid,
    category_id: Uuid,
    heat_number: i32,
    capacity: i32,
    scheduled_at: Option<NaiveDateTime>,
    started_at: Option<NaiveDateTime>,
}

#[derive(FromRow)]
struct AssignmentRow {
    heat_id: Uuid,
    entrant_id: Uuid,
    lane_number: i32,
}

fn to_i32(value: u32, what: &str) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| StorageError::ConstraintViolation(format!("{} out of range: {}", what, value)))
}

pub struct HeatRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> HeatRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_pair(&self, event_id: Uuid, category_id: Uuid) -> Result<Vec<Heat>> {
        let rows = sqlx::query_as::<_, HeatRow>(
            r#"
            SELECT heat_id, event_id, category_id, heat_number, capacity, scheduled_at, started_at
            FROM heats
            WHERE event_id = $1 AND category_id = $2
            ORDER BY heat_number
            "#,
        )
        .bind(event_id)
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        self.with_assignments(rows).await
    }

    pub async fn list_for_championship(&self, championship_id: Uuid) -> Result<Vec<Heat>> {
        let rows = sqlx::query_as::<_, HeatRow>(
            r#"
            SELECT h.heat_id, h.event_id, h.category_id, h.heat_number, h.capacity,
                   h.scheduled_at, h.started_at
            FROM heats h
            INNER JOIN events e ON h.event_id = e.event_id
            WHERE e.championship_id = $1
            ORDER BY e.ordinal, h.category_id, h.heat_number
            "#,
        )
        .bind(championship_id)
        .fetch_all(self.pool)
        .await?;

        self.with_assignments(rows).await
    }

    async fn with_assignments(&self, rows: Vec<HeatRow>) -> Result<Vec<Heat>> {
        let heat_ids: Vec<Uuid> = rows.iter().map(|row| row.heat_id).collect();

        let assignments = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT heat_id, entrant_id, lane_number
            FROM heat_assignments
            WHERE heat_id = ANY($1)
            ORDER BY heat_id, lane_number
            "#,
        )
        .bind(&heat_ids)
        .fetch_all(self.pool)
        .await?;

        let mut lanes: HashMap<Uuid, Vec<HeatAssignment>> = HashMap::new();
        for assignment in assignments {
            lanes
                .entry(assignment.heat_id)
                .or_default()
                .push(HeatAssignment {
                    entrant_id: assignment.entrant_id,
                    lane_number: unsigned_column(assignment.lane_number, "lane_number")?,
                });
        }

        rows.into_iter()
            .map(|row| -> Result<Heat> {
                Ok(Heat {
                    heat_id: row.heat_id,
                    event_id: row.event_id,
                    category_id: row.category_id,
                    heat_number: unsigned_column(row.heat_number, "heat_number")?,
                    capacity: unsigned_column(row.capacity, "capacity")?,
                    scheduled_at: row.scheduled_at,
                    started_at: row.started_at,
                    assignments: lanes.remove(&row.heat_id).unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Deletes every heat of the pair and inserts `heats`, in one transaction.
    ///
    /// The existing rows are locked first, so a heat that starts concurrently
    /// either blocks the replacement or is seen as started.
    pub async fn replace(
        &self,
        event_id: Uuid,
        category_id: Uuid,
        heats: &[NewHeat],
    ) -> Result<Vec<Heat>> {
        let mut tx = self.pool.begin().await?;

        let started: Vec<Option<NaiveDateTime>> = sqlx::query_scalar(
            r#"
            SELECT started_at
            FROM heats
            WHERE event_id = $1 AND category_id = $2
            FOR UPDATE
            "#,
        )
        .bind(event_id)
        .bind(category_id)
        .fetch_all(&mut *tx)
        .await?;

        if started.iter().any(Option::is_some) {
            return Err(StorageError::HeatsAlreadyStarted {
                event_id,
                category_id,
            });
        }

        sqlx::query("DELETE FROM heats WHERE event_id = $1 AND category_id = $2")
            .bind(event_id)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;

        let mut stored = Vec::with_capacity(heats.len());
        for heat in heats {
            let heat_id: Uuid = sqlx::query_scalar(
                r#"
                INSERT INTO heats (event_id, category_id, heat_number, capacity)
                VALUES ($1, $2, $3, $4)
                RETURNING heat_id
                "#,
            )
            .bind(event_id)
            .bind(category_id)
            .bind(to_i32(heat.heat_number, "heat number")?)
            .bind(to_i32(heat.capacity, "heat capacity")?)
            .fetch_one(&mut *tx)
            .await?;

            for assignment in &heat.assignments {
                sqlx::query(
                    r#"
                    INSERT INTO heat_assignments (heat_id, entrant_id, lane_number)
                    VALUES ($1, $2, $3)
                    "#,
                )
                .bind(heat_id)
                .bind(assignment.entrant_id)
                .bind(to_i32(assignment.lane_number, "lane number")?)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    let error = StorageError::from(e);
                    if error.is_unique_violation() || error.is_foreign_key_violation() {
                        return StorageError::ConstraintViolation(format!(
                            "invalid lane assignment for entrant {}",
                            assignment.entrant_id
                        ));
                    }
                    error
                })?;
            }

            stored.push(Heat {
                heat_id,
                event_id,
                category_id,
                heat_number: heat.heat_number,
                capacity: heat.capacity,
                scheduled_at: None,
                started_at: None,
                assignments: heat.assignments.clone(),
            });
        }

        tx.commit().await?;
        Ok(stored)
    }

    pub async fn set_start_times(&self, starts: &[HeatStart]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for start in starts {
            let updated = sqlx::query("UPDATE heats SET scheduled_at = $2 WHERE heat_id = $1")
                .bind(start.heat_id)
                .bind(start.starts_at)
                .execute(&mut *tx)
                .await?;

            if updated.rows_affected() == 0 {
                return Err(StorageError::NotFound);
            }
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn mark_started(&self, heat_id: Uuid, started_at: NaiveDateTime) -> Result<()> {
        let updated = sqlx::query("UPDATE heats SET started_at = $2 WHERE heat_id = $1")
            .bind(heat_id)
            .bind(started_at)
            .execute(self.pool)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
