use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dto::recompute::RecomputeReport;
use crate::error::{Result, StorageError};
use crate::models::{PointsOrder, PointsPreset, PointsTable, RankingDiscipline, ScoringScheme};

/// Request payload for replacing the scoring scheme of a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateScoringSchemeRequest {
    #[serde(default)]
    pub discipline: RankingDiscipline,

    #[serde(default)]
    pub preset: PointsPreset,

    /// Rank → points; required with the `custom` preset and ignored otherwise.
    #[schema(value_type = Option<Object>)]
    pub table: Option<BTreeMap<u32, Decimal>>,

    /// Defaults to the preset's natural order.
    pub points_order: Option<PointsOrder>,

    /// Defaults to a value that never beats a ranked result.
    #[validate(custom(function = "validate_points"))]
    #[schema(value_type = Option<String>)]
    pub non_finish_points: Option<Decimal>,

    #[validate(custom(function = "validate_points"))]
    #[schema(value_type = Option<String>)]
    pub no_show_points: Option<Decimal>,
}

fn validate_points(points: &Decimal) -> std::result::Result<(), validator::ValidationError> {
    if points.is_sign_negative() {
        return Err(validator::ValidationError::new("negative_points"));
    }
    Ok(())
}

impl UpdateScoringSchemeRequest {
    /// Builds the scheme, generating preset tables for a field of `field_size`.
    pub fn into_scheme(self, category_id: Uuid, field_size: usize) -> Result<ScoringScheme> {
        let table = match (self.preset, self.table) {
            (PointsPreset::Custom, Some(table)) => PointsTable::new(table)?,
            (PointsPreset::Custom, None) => {
                return Err(StorageError::InvalidConfiguration(
                    "the custom preset needs an explicit points table".to_string(),
                ));
            }
            (preset, _) => preset.table(field_size).ok_or_else(|| {
                StorageError::InvalidConfiguration(format!(
                    "preset '{}' has no generated table",
                    preset.as_str()
                ))
            })?,
        };

        let points_order = self.points_order.unwrap_or(self.preset.natural_order());
        let unranked = points_order.unranked_points(&table);
        let scheme = ScoringScheme {
            category_id,
            discipline: self.discipline,
            preset: self.preset,
            table,
            points_order,
            non_finish_points: self.non_finish_points.unwrap_or(unranked),
            no_show_points: self.no_show_points.unwrap_or(unranked),
        };
        scheme.validate()?;
        Ok(scheme)
    }
}

/// Response containing the scoring scheme of a category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoringSchemeResponse {
    pub category_id: Uuid,
    pub discipline: RankingDiscipline,
    pub preset: PointsPreset,
    #[schema(value_type = Object)]
    pub table: BTreeMap<u32, Decimal>,
    pub points_order: PointsOrder,
    #[schema(value_type = String)]
    pub non_finish_points: Decimal,
    #[schema(value_type = String)]
    pub no_show_points: Decimal,
    /// False when no scheme was stored yet and this is the default one.
    pub stored: bool,
}

impl ScoringSchemeResponse {
    pub fn new(scheme: ScoringScheme, stored: bool) -> Self {
        Self {
            category_id: scheme.category_id,
            discipline: scheme.discipline,
            preset: scheme.preset,
            table: scheme.table.into(),
            points_order: scheme.points_order,
            non_finish_points: scheme.non_finish_points,
            no_show_points: scheme.no_show_points,
            stored,
        }
    }
}

/// Saved scheme together with the recompute it triggered
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScoringSchemeUpdateResponse {
    pub scheme: ScoringSchemeResponse,
    pub recompute: RecomputeReport,
}
