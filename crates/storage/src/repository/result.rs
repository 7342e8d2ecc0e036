use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::unsigned_column;
use crate::error::{Result, StorageError};
use crate::models::{EventResult, ResultScore};

#[derive(FromRow)]
struct ResultRow {
    event_id: Uuid,
    entrant_id: Uuid,
    category_id: Uuid,
    raw_value: Option<String>,
    tiebreak_value: Option<String>,
    status: String,
    rank: Option<i32>,
    points: Option<Decimal>,
    updated_at: chrono::NaiveDateTime,
}

impl TryFrom<ResultRow> for EventResult {
    type Error = StorageError;

    fn try_from(row: ResultRow) -> Result<Self> {
        Ok(Self {
            event_id: row.event_id,
            entrant_id: row.entrant_id,
            category_id: row.category_id,
            raw_value: row.raw_value,
            tiebreak_value: row.tiebreak_value,
            status: row.status.parse()?,
            rank: row.rank.map(|rank| unsigned_column(rank, "rank")).transpose()?,
            points: row.points,
            updated_at: row.updated_at,
        })
    }
}

pub struct ResultRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ResultRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_category(&self, category_id: Uuid) -> Result<Vec<EventResult>> {
        let rows = sqlx::query_as::<_, ResultRow>(
            r#"
            SELECT event_id, entrant_id, category_id, raw_value, tiebreak_value,
                   status, rank, points, updated_at
            FROM results
            WHERE category_id = $1
            ORDER BY event_id, entrant_id
            "#,
        )
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(EventResult::try_from).collect()
    }

    /// Clears the derived columns of every result of the pair, then writes
    /// `scores`, in one transaction.
    pub async fn replace_event_scores(
        &self,
        event_id: Uuid,
        category_id: Uuid,
        scores: &[ResultScore],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE results
            SET rank = NULL, points = NULL
            WHERE event_id = $1 AND category_id = $2
            "#,
        )
        .bind(event_id)
        .bind(category_id)
        .execute(&mut *tx)
        .await?;

        for score in scores {
            let rank = score
                .rank
                .map(i32::try_from)
                .transpose()
                .map_err(|_| StorageError::ConstraintViolation("rank out of range".to_string()))?;

            let updated = sqlx::query(
                r#"
                UPDATE results
                SET rank = $4, points = $5
                WHERE event_id = $1 AND category_id = $2 AND entrant_id = $3
                "#,
            )
            .bind(event_id)
            .bind(category_id)
            .bind(score.entrant_id)
            .bind(rank)
            .bind(score.points)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(StorageError::ConstraintViolation(format!(
                    "no result of entrant {} for event {}",
                    score.entrant_id, event_id
                )));
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
