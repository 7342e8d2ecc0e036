use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Entrant, Event, EventResult, PointsOrder};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventScore {
    pub event_id: Uuid,
    pub rank: Option<u32>,
    pub points: Option<Decimal>,
}

/// One entrant's row on a category leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Standing {
    /// 1-based, unique.
    pub position: u32,
    pub entrant_id: Uuid,
    pub display_name: String,
    pub total_points: Decimal,
    pub first_places: u32,
    pub second_places: u32,
    pub third_places: u32,
    pub scored_events: u32,
    pub created_at: NaiveDateTime,
    /// In event ordinal order.
    pub events: Vec<EventScore>,
}

impl Standing {
    fn new(entrant: &Entrant) -> Self {
        Self {
            position: 0,
            entrant_id: entrant.entrant_id,
            display_name: entrant.display_name.clone(),
            total_points: Decimal::ZERO,
            first_places: 0,
            second_places: 0,
            third_places: 0,
            scored_events: 0,
            created_at: entrant.created_at,
            events: Vec::new(),
        }
    }

    fn add(&mut self, result: &EventResult) {
        if let Some(points) = result.points {
            self.total_points += points;
            self.scored_events += 1;
        }
        match result.rank {
            Some(1) => self.first_places += 1,
            Some(2) => self.second_places += 1,
            Some(3) => self.third_places += 1,
            _ => {}
        }
        self.events.push(EventScore {
            event_id: result.event_id,
            rank: result.rank,
            points: result.points,
        });
    }

    pub fn has_scores(&self) -> bool {
        self.scored_events > 0
    }
}

fn compare(a: &Standing, b: &Standing, order: PointsOrder) -> Ordering {
    b.has_scores()
        .cmp(&a.has_scores())
        .then_with(|| match order {
            PointsOrder::HigherWins => b.total_points.cmp(&a.total_points),
            PointsOrder::LowerWins => a.total_points.cmp(&b.total_points),
        })
        .then_with(|| b.first_places.cmp(&a.first_places))
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.entrant_id.cmp(&b.entrant_id))
}

/// Builds the standings of one category from its persisted results.
///
/// Every entrant gets a row, scored or not. Results of unknown entrants or of
/// events outside `events` are skipped.
pub fn aggregate(
    entrants: &[Entrant],
    events: &[Event],
    results: &[EventResult],
    order: PointsOrder,
) -> Vec<Standing> {
    let ordinals: HashMap<Uuid, i32> = events.iter().map(|e| (e.event_id, e.ordinal)).collect();

    let mut sorted_results: Vec<&EventResult> = results
        .iter()
        .filter(|result| ordinals.contains_key(&result.event_id))
        .collect();
    sorted_results.sort_by_key(|result| (ordinals.get(&result.event_id).copied(), result.event_id));

    let mut rows: HashMap<Uuid, Standing> = entrants
        .iter()
        .map(|entrant| (entrant.entrant_id, Standing::new(entrant)))
        .collect();

    for result in sorted_results {
        match rows.get_mut(&result.entrant_id) {
            Some(row) => row.add(result),
            None => debug!(
                entrant_id = %result.entrant_id,
                event_id = %result.event_id,
                "Skipping result of an entrant outside the category"
            ),
        }
    }

    let mut standings: Vec<Standing> = rows.into_values().collect();
    standings.sort_by(|a, b| compare(a, b, order));
    for (index, standing) in standings.iter_mut().enumerate() {
        standing.position = index as u32 + 1;
    }
    standings
}
