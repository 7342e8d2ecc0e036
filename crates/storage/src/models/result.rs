use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Completed,
    NonFinish,
    NoShow,
    /// Not yet submitted.
    Pending,
}

impl ResultStatus {
    pub fn is_submitted(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

text_enum!(ResultStatus, "result status", {
    Completed => "completed",
    NonFinish => "non_finish",
    NoShow => "no_show",
    Pending => "pending",
});

/// A raw result of one entrant in one event, plus the rank and points derived from it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventResult {
    pub event_id: Uuid,
    pub entrant_id: Uuid,
    pub category_id: Uuid,
    pub raw_value: Option<String>,
    pub tiebreak_value: Option<String>,
    pub status: ResultStatus,
    pub rank: Option<u32>,
    pub points: Option<Decimal>,
    pub updated_at: chrono::NaiveDateTime,
}

/// Derived rank and points written back for one result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResultScore {
    pub entrant_id: Uuid,
    pub rank: Option<u32>,
    pub points: Option<Decimal>,
}
