use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{Result, StorageError};

/// How entrants of a category are grouped; each format implies a fixed group size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntryFormat {
    Individual,
    Pair,
    Trio,
    Team(u16),
}

impl EntryFormat {
    pub fn group_size(&self) -> u16 {
        match self {
            Self::Individual => 1,
            Self::Pair => 2,
            Self::Trio => 3,
            Self::Team(size) => *size,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Pair => "pair",
            Self::Trio => "trio",
            Self::Team(_) => "team",
        }
    }

    /// Rebuilds the format from its stored name and group size.
    pub fn from_parts(kind: &str, size: i32) -> Result<Self> {
        match kind {
            "individual" => Ok(Self::Individual),
            "pair" => Ok(Self::Pair),
            "trio" => Ok(Self::Trio),
            "team" => u16::try_from(size)
                .ok()
                .filter(|size| *size >= 1)
                .map(Self::Team)
                .ok_or_else(|| {
                    StorageError::InvalidConfiguration(format!("invalid team size: {}", size))
                }),
            other => Err(StorageError::InvalidConfiguration(format!(
                "unknown entry format '{}'",
                other
            ))),
        }
    }
}

/// Order in which standings batches are turned into heat numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HeatOrder {
    /// Best standings group runs in heat 1.
    #[default]
    StandingsFirst,
    /// Same batches, reversed: the best group runs in the last heat.
    LeadersLast,
}

text_enum!(HeatOrder, "heat order", {
    StandingsFirst => "standings_first",
    LeadersLast => "leaders_last",
});

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub category_id: Uuid,
    pub championship_id: Uuid,
    pub name: String,
    pub entry_format: EntryFormat,
    /// Maximum number of entrants sharing one heat.
    pub heat_capacity: i32,
    pub heat_order: HeatOrder,
    /// Order of the category inside an event's block of heats.
    pub position: i32,
}

impl Category {
    /// Capacity as read right now; every scheduling run goes through this.
    pub fn heat_capacity(&self) -> Result<NonZeroUsize> {
        usize::try_from(self.heat_capacity)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| {
                StorageError::InvalidConfiguration(format!(
                    "category '{}' has heat capacity {}, expected at least 1",
                    self.name, self.heat_capacity
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(capacity: i32) -> Category {
        Category {
            category_id: Uuid::new_v4(),
            championship_id: Uuid::new_v4(),
            name: "RX Men".to_string(),
            entry_format: EntryFormat::Individual,
            heat_capacity: capacity,
            heat_order: HeatOrder::default(),
            position: 0,
        }
    }

    #[test]
    fn test_heat_capacity_must_be_positive() {
        assert_eq!(category(8).heat_capacity().unwrap().get(), 8);
        assert!(matches!(
            category(0).heat_capacity(),
            Err(StorageError::InvalidConfiguration(_))
        ));
        assert!(category(-3).heat_capacity().is_err());
    }

    #[test]
    fn test_entry_format_group_sizes() {
        assert_eq!(EntryFormat::Individual.group_size(), 1);
        assert_eq!(EntryFormat::Pair.group_size(), 2);
        assert_eq!(EntryFormat::Trio.group_size(), 3);
        assert_eq!(EntryFormat::from_parts("team", 4).unwrap(), EntryFormat::Team(4));
        assert!(EntryFormat::from_parts("team", 0).is_err());
        assert!(EntryFormat::from_parts("quartet", 4).is_err());
    }
}
