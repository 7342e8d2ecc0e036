//! Serializes recomputes per category and coalesces queued requests.
//!
//! Each category has one slot. A request joins the slot's waiting run when
//! there is one; otherwise it queues a new run behind the running one. The
//! waiting run only reads the store once it starts, so everyone who joined it
//! sees every write made before that point. Different categories never share
//! a slot.

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use storage::CompetitionStore;
use storage::dto::recompute::RecomputeReport;
use storage::error::StorageError;
use storage::services::pipeline;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error)]
pub enum RecomputeError {
    #[error(transparent)]
    Storage(Arc<StorageError>),

    #[error("Recompute task aborted: {0}")]
    Aborted(String),
}

pub type RecomputeOutcome = Result<Arc<RecomputeReport>, RecomputeError>;

type SharedRun = Shared<BoxFuture<'static, RecomputeOutcome>>;

#[derive(Default)]
struct Slot {
    running: tokio::sync::Mutex<()>,
    waiting: Mutex<Option<SharedRun>>,
}

#[derive(Clone)]
pub struct RecomputeCoordinator {
    store: Arc<dyn CompetitionStore>,
    slots: Arc<Mutex<HashMap<Uuid, Arc<Slot>>>>,
}

impl RecomputeCoordinator {
    pub fn new(store: Arc<dyn CompetitionStore>) -> Self {
        Self {
            store,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn slot(&self, category_id: Uuid) -> Arc<Slot> {
        self.slots.lock().entry(category_id).or_default().clone()
    }

    pub async fn recompute(&self, category_id: Uuid) -> RecomputeOutcome {
        let slot = self.slot(category_id);

        let run = {
            let mut waiting = slot.waiting.lock();
            match waiting.as_ref() {
                Some(run) => {
                    tracing::debug!(%category_id, "Joining queued recompute");
                    run.clone()
                }
                None => {
                    let task = tokio::spawn(run_when_free(
                        slot.clone(),
                        self.store.clone(),
                        category_id,
                    ));
                    let run = async move {
                        task.await
                            .unwrap_or_else(|e| Err(RecomputeError::Aborted(e.to_string())))
                    }
                    .boxed()
                    .shared();
                    *waiting = Some(run.clone());
                    run
                }
            }
        };

        let outcome = run.await;
        self.release(category_id, slot);
        outcome
    }

    /// Drops the category's slot once nothing but the map refers to it.
    ///
    /// Runs and requests each hold the slot while active, so a count of two
    /// (map and `slot`) means the category is idle.
    fn release(&self, category_id: Uuid, slot: Arc<Slot>) {
        let mut slots = self.slots.lock();
        let current = slots
            .get(&category_id)
            .is_some_and(|stored| Arc::ptr_eq(stored, &slot));
        if current && Arc::strong_count(&slot) == 2 {
            slots.remove(&category_id);
        }
    }
}

async fn run_when_free(
    slot: Arc<Slot>,
    store: Arc<dyn CompetitionStore>,
    category_id: Uuid,
) -> RecomputeOutcome {
    let _running = slot.running.lock().await;
    // From here on new requests queue a fresh run instead of joining this one.
    slot.waiting.lock().take();

    pipeline::recompute_category(store.as_ref(), category_id)
        .await
        .map(Arc::new)
        .map_err(|e| RecomputeError::Storage(Arc::new(e)))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use futures::future::join_all;
    use storage::MemoryStore;
    use storage::error::Result;
    use storage::models::{
        Category, Championship, DaySchedule, EntryFormat, Entrant, Event, EventResult, Heat,
        HeatOrder, HeatStart, NewHeat, ResultScore, ResultStatus, ResultType, ScoringScheme,
    };

    use super::*;

    /// Counts recompute runs (each starts with one category lookup) and
    /// makes them slow enough to overlap.
    struct SlowStore {
        inner: MemoryStore,
        category_reads: AtomicUsize,
    }

    #[async_trait]
    impl CompetitionStore for SlowStore {
        async fn championship(&self, championship_id: Uuid) -> Result<Championship> {
            self.inner.championship(championship_id).await
        }
        async fn categories(&self, championship_id: Uuid) -> Result<Vec<Category>> {
            self.inner.categories(championship_id).await
        }
        async fn category(&self, category_id: Uuid) -> Result<Category> {
            self.category_reads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.inner.category(category_id).await
        }
        async fn entrants(&self, category_id: Uuid) -> Result<Vec<Entrant>> {
            self.inner.entrants(category_id).await
        }
        async fn events(&self, championship_id: Uuid) -> Result<Vec<Event>> {
            self.inner.events(championship_id).await
        }
        async fn event(&self, event_id: Uuid) -> Result<Event> {
            self.inner.event(event_id).await
        }
        async fn day_schedules(&self, championship_id: Uuid) -> Result<Vec<DaySchedule>> {
            self.inner.day_schedules(championship_id).await
        }
        async fn category_results(&self, category_id: Uuid) -> Result<Vec<EventResult>> {
            self.inner.category_results(category_id).await
        }
        async fn scoring_scheme(&self, category_id: Uuid) -> Result<Option<ScoringScheme>> {
            self.inner.scoring_scheme(category_id).await
        }
        async fn save_scoring_scheme(&self, scheme: &ScoringScheme) -> Result<()> {
            self.inner.save_scoring_scheme(scheme).await
        }
        async fn replace_event_scores(
            &self,
            event_id: Uuid,
            category_id: Uuid,
            scores: &[ResultScore],
        ) -> Result<()> {
            self.inner
                .replace_event_scores(event_id, category_id, scores)
                .await
        }
        async fn heats(&self, event_id: Uuid, category_id: Uuid) -> Result<Vec<Heat>> {
            self.inner.heats(event_id, category_id).await
        }
        async fn championship_heats(&self, championship_id: Uuid) -> Result<Vec<Heat>> {
            self.inner.championship_heats(championship_id).await
        }
        async fn replace_heats(
            &self,
            event_id: Uuid,
            category_id: Uuid,
            heats: &[NewHeat],
        ) -> Result<Vec<Heat>> {
            self.inner.replace_heats(event_id, category_id, heats).await
        }
        async fn set_heat_start_times(&self, starts: &[HeatStart]) -> Result<()> {
            self.inner.set_heat_start_times(starts).await
        }
        async fn mark_heat_started(&self, heat_id: Uuid, started_at: NaiveDateTime) -> Result<()> {
            self.inner.mark_heat_started(heat_id, started_at).await
        }
    }

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 12)
            .unwrap()
            .and_hms_opt(8, minute, 0)
            .unwrap()
    }

    fn store() -> Arc<SlowStore> {
        let inner = MemoryStore::new();
        inner.insert_championship(Championship {
            championship_id: Uuid::from_u128(1),
            name: "Throwdown".to_string(),
            category_transition_minutes: 0,
            event_transition_minutes: 0,
            created_at: at(0),
        });
        for category_id in [10u128, 11] {
            inner
                .insert_category(Category {
                    category_id: Uuid::from_u128(category_id),
                    championship_id: Uuid::from_u128(1),
                    name: format!("Category {}", category_id),
                    entry_format: EntryFormat::Pair,
                    heat_capacity: 6,
                    heat_order: HeatOrder::StandingsFirst,
                    position: category_id as i32,
                })
                .unwrap();
        }
        inner
            .insert_event(Event {
                event_id: Uuid::from_u128(100),
                championship_id: Uuid::from_u128(1),
                name: "Synchro".to_string(),
                ordinal: 1,
                result_type: ResultType::RepetitionCount,
                day_number: 1,
                time_cap_minutes: Some(10),
            })
            .unwrap();
        for entrant in [1u128, 2] {
            inner
                .insert_entrant(Entrant {
                    entrant_id: Uuid::from_u128(entrant),
                    category_id: Uuid::from_u128(10),
                    display_name: format!("Team {}", entrant),
                    created_at: at(entrant as u32),
                })
                .unwrap();
        }
        Arc::new(SlowStore {
            inner,
            category_reads: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_simultaneous_requests_share_one_run() {
        let store = store();
        let coordinator = RecomputeCoordinator::new(store.clone());

        let outcomes = join_all((0..5).map(|_| coordinator.recompute(Uuid::from_u128(10)))).await;

        assert!(outcomes.iter().all(|outcome| outcome.is_ok()));
        assert_eq!(store.category_reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_request_during_run_queues_a_fresh_run() {
        let store = store();
        let coordinator = RecomputeCoordinator::new(store.clone());
        let category_id = Uuid::from_u128(10);

        let first = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.recompute(category_id).await }
        });
        tokio::time::sleep(Duration::from_millis(5)).await;

        store
            .inner
            .submit_result(
                Uuid::from_u128(100),
                Uuid::from_u128(2),
                ResultStatus::Completed,
                Some("80"),
                None,
            )
            .unwrap();
        let second = coordinator.recompute(category_id).await.unwrap();
        assert!(first.await.unwrap().is_ok());

        assert_eq!(store.category_reads.load(Ordering::SeqCst), 2);
        assert_eq!(second.standings[0].entrant_id, Uuid::from_u128(2));
        assert!(second.standings[0].has_scores());
    }

    #[tokio::test]
    async fn test_categories_do_not_share_runs() {
        let store = store();
        let coordinator = RecomputeCoordinator::new(store.clone());

        let (a, b) = tokio::join!(
            coordinator.recompute(Uuid::from_u128(10)),
            coordinator.recompute(Uuid::from_u128(11))
        );

        assert_eq!(a.unwrap().category_id, Uuid::from_u128(10));
        assert_eq!(b.unwrap().category_id, Uuid::from_u128(11));
        assert_eq!(store.category_reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_slots_are_released_once_idle() {
        let store = store();
        let coordinator = RecomputeCoordinator::new(store.clone());

        let outcomes = join_all(
            [10u128, 10, 11, 99]
                .into_iter()
                .map(|category| coordinator.recompute(Uuid::from_u128(category))),
        )
        .await;
        assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 3);
        assert!(coordinator.slots.lock().is_empty());

        coordinator.recompute(Uuid::from_u128(10)).await.unwrap();
        assert!(coordinator.slots.lock().is_empty());
        assert_eq!(store.category_reads.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_failures_reach_every_waiter() {
        let store = store();
        let coordinator = RecomputeCoordinator::new(store);

        let outcomes = join_all((0..3).map(|_| coordinator.recompute(Uuid::from_u128(99)))).await;

        for outcome in outcomes {
            match outcome {
                Err(RecomputeError::Storage(e)) => assert!(matches!(*e, StorageError::NotFound)),
                other => panic!("expected not found, got {:?}", other.map(|r| r.category_id)),
            }
        }
    }
}
