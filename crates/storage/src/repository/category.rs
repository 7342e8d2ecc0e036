use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Category, EntryFormat, Entrant, PointsTable, ScoringScheme};

#[derive(FromRow)]
struct CategoryRow {
    category_id: Uuid,
    championship_id: Uuid,
    name: String,
    entry_format: String,
    group_size: i32,
    heat_capacity: i32,
    heat_order: String,
    position: i32,
}

impl TryFrom<CategoryRow> for Category {
    type Error = StorageError;

    fn try_from(row: CategoryRow) -> Result<Self> {
        Ok(Self {
            category_id: row.category_id,
            championship_id: row.championship_id,
            name: row.name,
            entry_format: EntryFormat::from_parts(&row.entry_format, row.group_size)?,
            heat_capacity: row.heat_capacity,
            heat_order: row.heat_order.parse()?,
            position: row.position,
        })
    }
}

#[derive(FromRow)]
struct SchemeRow {
    category_id: Uuid,
    discipline: String,
    preset: String,
    points_order: String,
    points_table: Json<PointsTable>,
    non_finish_points: Decimal,
    no_show_points: Decimal,
}

impl TryFrom<SchemeRow> for ScoringScheme {
    type Error = StorageError;

    fn try_from(row: SchemeRow) -> Result<Self> {
        let scheme = Self {
            category_id: row.category_id,
            discipline: row.discipline.parse()?,
            preset: row.preset.parse()?,
            table: row.points_table.0,
            points_order: row.points_order.parse()?,
            non_finish_points: row.non_finish_points,
            no_show_points: row.no_show_points,
        };
        scheme.validate()?;
        Ok(scheme)
    }
}

const CATEGORY_COLUMNS: &str = "category_id, championship_id, name, entry_format, group_size, \
                                heat_capacity, heat_order, position";

pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, category_id: Uuid) -> Result<Category> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {} FROM categories WHERE category_id = $1",
            CATEGORY_COLUMNS
        ))
        .bind(category_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)?;

        Category::try_from(row)
    }

    /// Categories of a championship in schedule order.
    pub async fn list_by_championship(&self, championship_id: Uuid) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {} FROM categories WHERE championship_id = $1 ORDER BY position, name",
            CATEGORY_COLUMNS
        ))
        .bind(championship_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    pub async fn list_entrants(&self, category_id: Uuid) -> Result<Vec<Entrant>> {
        let entrants = sqlx::query_as::<_, Entrant>(
            r#"
            SELECT entrant_id, category_id, display_name, created_at
            FROM entrants
            WHERE category_id = $1
            ORDER BY created_at, entrant_id
            "#,
        )
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;

        Ok(entrants)
    }

    pub async fn find_scoring_scheme(&self, category_id: Uuid) -> Result<Option<ScoringScheme>> {
        let row = sqlx::query_as::<_, SchemeRow>(
            r#"
            SELECT category_id, discipline, preset, points_order, points_table,
                   non_finish_points, no_show_points
            FROM scoring_schemes
            WHERE category_id = $1
            "#,
        )
        .bind(category_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(ScoringScheme::try_from).transpose()
    }

    pub async fn upsert_scoring_scheme(&self, scheme: &ScoringScheme) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO scoring_schemes (
                category_id, discipline, preset, points_order, points_table,
                non_finish_points, no_show_points, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (category_id) DO UPDATE SET
                discipline = EXCLUDED.discipline,
                preset = EXCLUDED.preset,
                points_order = EXCLUDED.points_order,
                points_table = EXCLUDED.points_table,
                non_finish_points = EXCLUDED.non_finish_points,
                no_show_points = EXCLUDED.no_show_points,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(scheme.category_id)
        .bind(scheme.discipline.as_str())
        .bind(scheme.preset.as_str())
        .bind(scheme.points_order.as_str())
        .bind(Json(&scheme.table))
        .bind(scheme.non_finish_points)
        .bind(scheme.no_show_points)
        .bind(Utc::now().naive_utc())
        .execute(self.pool)
        .await
        .map_err(|e| {
            let error = StorageError::from(e);
            if error.is_foreign_key_violation() {
                return StorageError::NotFound;
            }
            error
        })?;

        Ok(())
    }
}
