//! In-memory store for tests and local runs.
//!
//! Every write takes the single lock once, so batches are atomic for readers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use super::CompetitionStore;
use crate::error::{Result, StorageError};
use crate::models::{
    Category, Championship, DaySchedule, Entrant, Event, EventResult, Heat, HeatStart, NewHeat,
    ResultScore, ResultStatus, ScoringScheme,
};

#[derive(Default)]
struct MemoryData {
    championships: HashMap<Uuid, Championship>,
    categories: HashMap<Uuid, Category>,
    entrants: HashMap<Uuid, Entrant>,
    events: HashMap<Uuid, Event>,
    day_schedules: Vec<DaySchedule>,
    /// Keyed by (event_id, entrant_id).
    results: HashMap<(Uuid, Uuid), EventResult>,
    schemes: HashMap<Uuid, ScoringScheme>,
    heats: HashMap<Uuid, Heat>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<MemoryData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_championship(&self, championship: Championship) {
        self.data
            .write()
            .championships
            .insert(championship.championship_id, championship);
    }

    pub fn insert_category(&self, category: Category) -> Result<()> {
        let mut data = self.data.write();
        if !data.championships.contains_key(&category.championship_id) {
            return Err(StorageError::ConstraintViolation(format!(
                "unknown championship {}",
                category.championship_id
            )));
        }
        data.categories.insert(category.category_id, category);
        Ok(())
    }

    pub fn insert_entrant(&self, entrant: Entrant) -> Result<()> {
        let mut data = self.data.write();
        if !data.categories.contains_key(&entrant.category_id) {
            return Err(StorageError::ConstraintViolation(format!(
                "unknown category {}",
                entrant.category_id
            )));
        }
        data.entrants.insert(entrant.entrant_id, entrant);
        Ok(())
    }

    pub fn insert_event(&self, event: Event) -> Result<()> {
        let mut data = self.data.write();
        if !data.championships.contains_key(&event.championship_id) {
            return Err(StorageError::ConstraintViolation(format!(
                "unknown championship {}",
                event.championship_id
            )));
        }
        data.events.insert(event.event_id, event);
        Ok(())
    }

    pub fn insert_day_schedule(&self, day: DaySchedule) {
        let mut data = self.data.write();
        data.day_schedules
            .retain(|d| !(d.championship_id == day.championship_id && d.day_number == day.day_number));
        data.day_schedules.push(day);
    }

    /// Records a raw result, replacing any earlier one of the same entrant
    /// and event. Derived rank and points are cleared until the next recompute.
    pub fn submit_result(
        &self,
        event_id: Uuid,
        entrant_id: Uuid,
        status: ResultStatus,
        raw_value: Option<&str>,
        tiebreak_value: Option<&str>,
    ) -> Result<()> {
        let mut data = self.data.write();
        if !data.events.contains_key(&event_id) {
            return Err(StorageError::ConstraintViolation(format!("unknown event {}", event_id)));
        }
        let category_id = data
            .entrants
            .get(&entrant_id)
            .map(|entrant| entrant.category_id)
            .ok_or_else(|| StorageError::ConstraintViolation(format!("unknown entrant {}", entrant_id)))?;

        data.results.insert(
            (event_id, entrant_id),
            EventResult {
                event_id,
                entrant_id,
                category_id,
                raw_value: raw_value.map(str::to_string),
                tiebreak_value: tiebreak_value.map(str::to_string),
                status,
                rank: None,
                points: None,
                updated_at: Utc::now().naive_utc(),
            },
        );
        Ok(())
    }
}

#[async_trait]
impl CompetitionStore for MemoryStore {
    async fn championship(&self, championship_id: Uuid) -> Result<Championship> {
        self.data
            .read()
            .championships
            .get(&championship_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn categories(&self, championship_id: Uuid) -> Result<Vec<Category>> {
        let data = self.data.read();
        let mut categories: Vec<Category> = data
            .categories
            .values()
            .filter(|c| c.championship_id == championship_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));
        Ok(categories)
    }

    async fn category(&self, category_id: Uuid) -> Result<Category> {
        self.data
            .read()
            .categories
            .get(&category_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn entrants(&self, category_id: Uuid) -> Result<Vec<Entrant>> {
        let data = self.data.read();
        let mut entrants: Vec<Entrant> = data
            .entrants
            .values()
            .filter(|e| e.category_id == category_id)
            .cloned()
            .collect();
        entrants.sort_by_key(|e| (e.created_at, e.entrant_id));
        Ok(entrants)
    }

    async fn events(&self, championship_id: Uuid) -> Result<Vec<Event>> {
        let data = self.data.read();
        let mut events: Vec<Event> = data
            .events
            .values()
            .filter(|e| e.championship_id == championship_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.ordinal, e.event_id));
        Ok(events)
    }

    async fn event(&self, event_id: Uuid) -> Result<Event> {
        self.data
            .read()
            .events
            .get(&event_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn day_schedules(&self, championship_id: Uuid) -> Result<Vec<DaySchedule>> {
        let data = self.data.read();
        let mut days: Vec<DaySchedule> = data
            .day_schedules
            .iter()
            .filter(|d| d.championship_id == championship_id)
            .cloned()
            .collect();
        days.sort_by_key(|d| d.day_number);
        Ok(days)
    }

    async fn category_results(&self, category_id: Uuid) -> Result<Vec<EventResult>> {
        let data = self.data.read();
        let mut results: Vec<EventResult> = data
            .results
            .values()
            .filter(|r| r.category_id == category_id)
            .cloned()
            .collect();
        results.sort_by_key(|r| (r.event_id, r.entrant_id));
        Ok(results)
    }

    async fn scoring_scheme(&self, category_id: Uuid) -> Result<Option<ScoringScheme>> {
        Ok(self.data.read().schemes.get(&category_id).cloned())
    }

    async fn save_scoring_scheme(&self, scheme: &ScoringScheme) -> Result<()> {
        let mut data = self.data.write();
        if !data.categories.contains_key(&scheme.category_id) {
            return Err(StorageError::NotFound);
        }
        data.schemes.insert(scheme.category_id, scheme.clone());
        Ok(())
    }

    async fn replace_event_scores(
        &self,
        event_id: Uuid,
        category_id: Uuid,
        scores: &[ResultScore],
    ) -> Result<()> {
        let mut data = self.data.write();
        if let Some(missing) = scores
            .iter()
            .find(|score| !data.results.contains_key(&(event_id, score.entrant_id)))
        {
            return Err(StorageError::ConstraintViolation(format!(
                "no result of entrant {} for event {}",
                missing.entrant_id, event_id
            )));
        }
        for result in data.results.values_mut() {
            if result.event_id == event_id && result.category_id == category_id {
                result.rank = None;
                result.points = None;
            }
        }
        for score in scores {
            if let Some(result) = data.results.get_mut(&(event_id, score.entrant_id))
                && result.category_id == category_id
            {
                result.rank = score.rank;
                result.points = score.points;
            }
        }
        Ok(())
    }

    async fn heats(&self, event_id: Uuid, category_id: Uuid) -> Result<Vec<Heat>> {
        let data = self.data.read();
        let mut heats: Vec<Heat> = data
            .heats
            .values()
            .filter(|h| h.event_id == event_id && h.category_id == category_id)
            .cloned()
            .collect();
        heats.sort_by_key(|h| h.heat_number);
        Ok(heats)
    }

    async fn championship_heats(&self, championship_id: Uuid) -> Result<Vec<Heat>> {
        let data = self.data.read();
        let mut heats: Vec<Heat> = data
            .heats
            .values()
            .filter(|h| {
                data.events
                    .get(&h.event_id)
                    .is_some_and(|e| e.championship_id == championship_id)
            })
            .cloned()
            .collect();
        heats.sort_by_key(|h| (h.event_id, h.category_id, h.heat_number));
        Ok(heats)
    }

    async fn replace_heats(
        &self,
        event_id: Uuid,
        category_id: Uuid,
        heats: &[NewHeat],
    ) -> Result<Vec<Heat>> {
        let mut data = self.data.write();
        let same_pair = |h: &Heat| h.event_id == event_id && h.category_id == category_id;

        if data.heats.values().any(|h| same_pair(h) && h.has_started()) {
            return Err(StorageError::HeatsAlreadyStarted {
                event_id,
                category_id,
            });
        }
        data.heats.retain(|_, h| !same_pair(&*h));

        let stored: Vec<Heat> = heats
            .iter()
            .map(|heat| Heat {
                heat_id: Uuid::new_v4(),
                event_id,
                category_id,
                heat_number: heat.heat_number,
                capacity: heat.capacity,
                scheduled_at: None,
                started_at: None,
                assignments: heat.assignments.clone(),
            })
            .collect();
        for heat in &stored {
            data.heats.insert(heat.heat_id, heat.clone());
        }
        Ok(stored)
    }

    async fn set_heat_start_times(&self, starts: &[HeatStart]) -> Result<()> {
        let mut data = self.data.write();
        if starts.iter().any(|start| !data.heats.contains_key(&start.heat_id)) {
            return Err(StorageError::NotFound);
        }
        for start in starts {
            if let Some(heat) = data.heats.get_mut(&start.heat_id) {
                heat.scheduled_at = Some(start.starts_at);
            }
        }
        Ok(())
    }

    async fn mark_heat_started(&self, heat_id: Uuid, started_at: NaiveDateTime) -> Result<()> {
        let mut data = self.data.write();
        let heat = data.heats.get_mut(&heat_id).ok_or(StorageError::NotFound)?;
        heat.started_at = Some(started_at);
        Ok(())
    }
}
