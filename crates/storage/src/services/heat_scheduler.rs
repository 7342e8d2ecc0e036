use std::num::NonZeroUsize;

use uuid::Uuid;

use super::leaderboard::Standing;
use crate::models::{HeatAssignment, HeatOrder, NewHeat};

/// Entrants in the order they are seeded into heats, best first.
///
/// Before anyone has a scored result the order is creation time, oldest first.
pub fn seeding_order(standings: &[Standing]) -> Vec<Uuid> {
    let mut seeded: Vec<&Standing> = standings.iter().collect();
    if !standings.iter().any(Standing::has_scores) {
        seeded.sort_by_key(|standing| (standing.created_at, standing.entrant_id));
    }
    seeded.iter().map(|standing| standing.entrant_id).collect()
}

/// Splits `seeding` into consecutive heats of at most `capacity` entrants.
///
/// Heats are numbered from 1 and lanes from 1 within each heat. With
/// [`HeatOrder::LeadersLast`] the batches are identical but numbered in
/// reverse, so the first batch of `seeding` runs in the last heat.
pub fn plan_heats(seeding: &[Uuid], capacity: NonZeroUsize, order: HeatOrder) -> Vec<NewHeat> {
    let mut batches: Vec<&[Uuid]> = seeding.chunks(capacity.get()).collect();
    if order == HeatOrder::LeadersLast {
        batches.reverse();
    }

    batches
        .into_iter()
        .enumerate()
        .map(|(index, batch)| NewHeat {
            heat_number: index as u32 + 1,
            capacity: capacity.get() as u32,
            assignments: batch
                .iter()
                .enumerate()
                .map(|(lane, entrant_id)| HeatAssignment {
                    entrant_id: *entrant_id,
                    lane_number: lane as u32 + 1,
                })
                .collect(),
        })
        .collect()
}
