use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::points_table::{CHAMPIONSHIP_TABLE_SIZE, PointsTable};
use crate::error::{Result, StorageError};

/// How tied entrants move the next rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RankingDiscipline {
    /// Competition ranking: 1, 1, 3, 4.
    #[default]
    Standard,
    /// 1, 1, 2, 3.
    Dense,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PointsPreset {
    #[default]
    Championship,
    Linear,
    Custom,
}

/// Direction in which accumulated points are better.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PointsOrder {
    #[default]
    HigherWins,
    LowerWins,
}

text_enum!(RankingDiscipline, "ranking discipline", {
    Standard => "standard",
    Dense => "dense",
});

text_enum!(PointsPreset, "points preset", {
    Championship => "championship",
    Linear => "linear",
    Custom => "custom",
});

text_enum!(PointsOrder, "points order", {
    HigherWins => "higher_wins",
    LowerWins => "lower_wins",
});

impl PointsPreset {
    /// Generated table for the preset; `Custom` has none.
    pub fn table(&self, field_size: usize) -> Option<PointsTable> {
        match self {
            Self::Championship => Some(PointsTable::championship()),
            Self::Linear => {
                let size = u32::try_from(field_size)
                    .unwrap_or(u32::MAX)
                    .max(CHAMPIONSHIP_TABLE_SIZE);
                Some(PointsTable::linear(size))
            }
            Self::Custom => None,
        }
    }

    /// Rank-equals-points tables are won with the fewest points.
    pub fn natural_order(&self) -> PointsOrder {
        match self {
            Self::Linear => PointsOrder::LowerWins,
            Self::Championship | Self::Custom => PointsOrder::HigherWins,
        }
    }
}

impl PointsOrder {
    /// Default non-finish and no-show value: never better than a ranked result.
    pub fn unranked_points(&self, table: &PointsTable) -> Decimal {
        match self {
            Self::HigherWins => Decimal::ZERO,
            Self::LowerWins => table.max_points() + Decimal::ONE,
        }
    }
}

/// Scoring configuration of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringScheme {
    pub category_id: Uuid,
    pub discipline: RankingDiscipline,
    pub preset: PointsPreset,
    pub table: PointsTable,
    pub points_order: PointsOrder,
    pub non_finish_points: Decimal,
    pub no_show_points: Decimal,
}

impl ScoringScheme {
    /// Scheme used when a category is scored before anyone configured it.
    pub fn default_for(category_id: Uuid) -> Self {
        Self {
            category_id,
            discipline: RankingDiscipline::Standard,
            preset: PointsPreset::Championship,
            table: PointsTable::championship(),
            points_order: PointsOrder::HigherWins,
            non_finish_points: Decimal::ZERO,
            no_show_points: Decimal::ZERO,
        }
    }

    /// Builds a scheme from a preset, generating its table.
    ///
    /// `Custom` requires an explicit table; use [`ScoringScheme::custom`].
    pub fn from_preset(category_id: Uuid, preset: PointsPreset, field_size: usize) -> Result<Self> {
        let table = preset.table(field_size).ok_or_else(|| {
            StorageError::InvalidConfiguration(
                "the custom preset needs an explicit points table".to_string(),
            )
        })?;
        let points_order = preset.natural_order();
        let unranked = points_order.unranked_points(&table);
        Ok(Self {
            preset,
            table,
            points_order,
            non_finish_points: unranked,
            no_show_points: unranked,
            ..Self::default_for(category_id)
        })
    }

    pub fn custom(category_id: Uuid, table: PointsTable, points_order: PointsOrder) -> Self {
        let unranked = points_order.unranked_points(&table);
        Self {
            preset: PointsPreset::Custom,
            table,
            points_order,
            non_finish_points: unranked,
            no_show_points: unranked,
            ..Self::default_for(category_id)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.table.is_empty() {
            return Err(StorageError::InvalidConfiguration(
                "points table must define at least one rank".to_string(),
            ));
        }
        if self.non_finish_points.is_sign_negative() {
            return Err(StorageError::InvalidConfiguration(format!(
                "non-finish points must not be negative, got {}",
                self.non_finish_points
            )));
        }
        if self.no_show_points.is_sign_negative() {
            return Err(StorageError::InvalidConfiguration(format!(
                "no-show points must not be negative, got {}",
                self.no_show_points
            )));
        }
        if self.points_order == PointsOrder::LowerWins {
            let worst = self.table.max_points();
            for (what, points) in [
                ("non-finish", self.non_finish_points),
                ("no-show", self.no_show_points),
            ] {
                if points < worst {
                    return Err(StorageError::InvalidConfiguration(format!(
                        "{} points ({}) would beat a ranked result when fewer points win; \
                         use at least {}",
                        what, points, worst
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn points_for_rank(&self, rank: u32) -> Decimal {
        self.table.points(rank)
    }
}
