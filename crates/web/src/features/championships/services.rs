use futures::future::join_all;
use storage::{
    CompetitionStore,
    dto::{
        heat::TimetableResponse,
        recompute::{CategoryFailure, ChampionshipRecomputeReport},
    },
    error::Result,
    services::pipeline,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::coordinator::RecomputeCoordinator;

/// Recomputes every category through the coordinator, so each one joins
/// or queues behind recomputes already requested for it.
pub async fn recompute_championship(
    store: &dyn CompetitionStore,
    coordinator: &RecomputeCoordinator,
    championship_id: Uuid,
) -> Result<ChampionshipRecomputeReport> {
    store.championship(championship_id).await?;
    let categories = store.categories(championship_id).await?;

    let outcomes = join_all(
        categories
            .iter()
            .map(|category| coordinator.recompute(category.category_id)),
    )
    .await;

    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for (category, outcome) in categories.iter().zip(outcomes) {
        match outcome {
            Ok(report) => reports.push((*report).clone()),
            Err(e) => {
                warn!(category_id = %category.category_id, "Recompute failed: {}", e);
                failures.push(CategoryFailure {
                    category_id: category.category_id,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        %championship_id,
        recomputed = reports.len(),
        failed = failures.len(),
        "Recomputed championship"
    );

    Ok(ChampionshipRecomputeReport {
        championship_id,
        categories: reports,
        failures,
    })
}

pub async fn rebuild_timetable(
    store: &dyn CompetitionStore,
    championship_id: Uuid,
) -> Result<TimetableResponse> {
    pipeline::rebuild_timetable(store, championship_id).await
}
