use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use super::CompetitionStore;
use super::category::CategoryRepository;
use super::championship::ChampionshipRepository;
use super::heat::HeatRepository;
use super::result::ResultRepository;
use crate::Database;
use crate::error::Result;
use crate::models::{
    Category, Championship, DaySchedule, Entrant, Event, EventResult, Heat, HeatStart, NewHeat,
    ResultScore, ScoringScheme,
};

#[async_trait]
impl CompetitionStore for Database {
    async fn championship(&self, championship_id: Uuid) -> Result<Championship> {
        ChampionshipRepository::new(self.pool())
            .find_by_id(championship_id)
            .await
    }

    async fn categories(&self, championship_id: Uuid) -> Result<Vec<Category>> {
        CategoryRepository::new(self.pool())
            .list_by_championship(championship_id)
            .await
    }

    async fn category(&self, category_id: Uuid) -> Result<Category> {
        CategoryRepository::new(self.pool()).find_by_id(category_id).await
    }

    async fn entrants(&self, category_id: Uuid) -> Result<Vec<Entrant>> {
        CategoryRepository::new(self.pool()).list_entrants(category_id).await
    }

    async fn events(&self, championship_id: Uuid) -> Result<Vec<Event>> {
        ChampionshipRepository::new(self.pool())
            .list_events(championship_id)
            .await
    }

    async fn event(&self, event_id: Uuid) -> Result<Event> {
        ChampionshipRepository::new(self.pool()).find_event(event_id).await
    }

    async fn day_schedules(&self, championship_id: Uuid) -> Result<Vec<DaySchedule>> {
        ChampionshipRepository::new(self.pool())
            .list_day_schedules(championship_id)
            .await
    }

    async fn category_results(&self, category_id: Uuid) -> Result<Vec<EventResult>> {
        ResultRepository::new(self.pool()).list_by_category(category_id).await
    }

    async fn scoring_scheme(&self, category_id: Uuid) -> Result<Option<ScoringScheme>> {
        CategoryRepository::new(self.pool())
            .find_scoring_scheme(category_id)
            .await
    }

    async fn save_scoring_scheme(&self, scheme: &ScoringScheme) -> Result<()> {
        CategoryRepository::new(self.pool())
            .upsert_scoring_scheme(scheme)
            .await
    }

    async fn replace_event_scores(
        &self,
        event_id: Uuid,
        category_id: Uuid,
        scores: &[ResultScore],
    ) -> Result<()> {
        ResultRepository::new(self.pool())
            .replace_event_scores(event_id, category_id, scores)
            .await
    }

    async fn heats(&self, event_id: Uuid, category_id: Uuid) -> Result<Vec<Heat>> {
        HeatRepository::new(self.pool())
            .list_for_pair(event_id, category_id)
            .await
    }

    async fn championship_heats(&self, championship_id: Uuid) -> Result<Vec<Heat>> {
        HeatRepository::new(self.pool())
            .list_for_championship(championship_id)
            .await
    }

    async fn replace_heats(
        &self,
        event_id: Uuid,
        category_id: Uuid,
        heats: &[NewHeat],
    ) -> Result<Vec<Heat>> {
        HeatRepository::new(self.pool())
            .replace(event_id, category_id, heats)
            .await
    }

    async fn set_heat_start_times(&self, starts: &[HeatStart]) -> Result<()> {
        HeatRepository::new(self.pool()).set_start_times(starts).await
    }

    async fn mark_heat_started(&self, heat_id: Uuid, started_at: NaiveDateTime) -> Result<()> {
        HeatRepository::new(self.pool())
            .mark_started(heat_id, started_at)
            .await
    }
}
