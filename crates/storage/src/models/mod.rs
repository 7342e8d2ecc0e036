/// `as_str`/`FromStr` pair for enums stored as text columns.
macro_rules! text_enum {
    ($ty:ident, $what:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::str::FromStr for $ty {
            type Err = crate::error::StorageError;

            fn from_str(s: &str) -> crate::error::Result<Self> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(crate::error::StorageError::InvalidConfiguration(format!(
                        concat!("unknown ", $what, " '{}'"),
                        other
                    ))),
                }
            }
        }
    };
}

pub mod category;
pub mod championship;
pub mod day_schedule;
pub mod entrant;
pub mod event;
pub mod heat;
pub mod points_table;
pub mod result;
pub mod scoring_scheme;

pub use category::{Category, EntryFormat, HeatOrder};
pub use championship::Championship;
pub use day_schedule::{BreakWindow, DaySchedule};
pub use entrant::Entrant;
pub use event::{Event, ResultType};
pub use heat::{Heat, HeatAssignment, HeatStart, NewHeat};
pub use points_table::PointsTable;
pub use result::{EventResult, ResultScore, ResultStatus};
pub use scoring_scheme::{PointsOrder, PointsPreset, RankingDiscipline, ScoringScheme};
