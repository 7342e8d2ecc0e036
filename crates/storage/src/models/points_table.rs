use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};

/// Number of ranks covered by the championship preset.
pub const CHAMPIONSHIP_TABLE_SIZE: u32 = 40;

/// Rank → points mapping of a scoring scheme.
///
/// Always holds at least one entry with every rank ≥ 1 and every value ≥ 0;
/// deserialization goes through the same check as [`PointsTable::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<u32, Decimal>",
    into = "BTreeMap<u32, Decimal>"
)]
pub struct PointsTable {
    entries: BTreeMap<u32, Decimal>,
}

impl PointsTable {
    pub fn new(entries: BTreeMap<u32, Decimal>) -> Result<Self> {
        if entries.is_empty() {
            return Err(StorageError::InvalidConfiguration(
                "points table must define at least one rank".to_string(),
            ));
        }
        if entries.contains_key(&0) {
            return Err(StorageError::InvalidConfiguration(
                "points table ranks start at 1".to_string(),
            ));
        }
        if let Some((rank, points)) = entries.iter().find(|(_, points)| points.is_sign_negative()) {
            return Err(StorageError::InvalidConfiguration(format!(
                "points for rank {} must not be negative, got {}",
                rank, points
            )));
        }
        Ok(Self { entries })
    }

    /// Steeply diminishing curve for large fields: 100, 97, … 70 for ranks 1–11,
    /// then two points less per rank down to 12 at rank 40.
    pub fn championship() -> Self {
        let entries = (1..=CHAMPIONSHIP_TABLE_SIZE)
            .map(|rank| {
                let points = if rank <= 11 {
                    100 - 3 * (rank - 1)
                } else {
                    68 - 2 * (rank - 12)
                };
                (rank, Decimal::from(points))
            })
            .collect();
        Self { entries }
    }

    /// Points equal rank, for ranks 1..=size.
    pub fn linear(size: u32) -> Self {
        let entries = (1..=size.max(1))
            .map(|rank| (rank, Decimal::from(rank)))
            .collect();
        Self { entries }
    }

    /// Points awarded for `rank`.
    ///
    /// A rank without its own entry takes the value of the nearest defined rank
    /// above it in the standings, so ranks past the end of the table all get
    /// the last entry's value and never fall to zero.
    pub fn points(&self, rank: u32) -> Decimal {
        self.entries
            .range(..=rank)
            .next_back()
            .or_else(|| self.entries.iter().next())
            .map(|(_, points)| *points)
            .unwrap_or(Decimal::ZERO)
    }

    /// Largest value in the table; the worst placing under lower-wins scoring.
    pub fn max_points(&self) -> Decimal {
        self.entries.values().max().copied().unwrap_or(Decimal::ZERO)
    }

    pub fn entries(&self) -> impl Iterator<Item = (u32, Decimal)> + '_ {
        self.entries.iter().map(|(rank, points)| (*rank, *points))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<BTreeMap<u32, Decimal>> for PointsTable {
    type Error = StorageError;

    fn try_from(entries: BTreeMap<u32, Decimal>) -> Result<Self> {
        Self::new(entries)
    }
}

impl From<PointsTable> for BTreeMap<u32, Decimal> {
    fn from(table: PointsTable) -> Self {
        table.entries
    }
}
