//! Command and query functions over a [`CompetitionStore`].
//!
//! Each function reads what it needs, computes in memory and writes its
//! output as one batch per event (scores) or per event-category pair (heats).

use std::collections::HashMap;

use futures::future::join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::heat_scheduler::{plan_heats, seeding_order};
use super::leaderboard::{Standing, aggregate};
use super::ranking::rank_event;
use super::timetable::{TimetableInput, build_timetable};
use crate::dto::heat::TimetableResponse;
use crate::dto::leaderboard::LeaderboardResponse;
use crate::dto::recompute::{
    CategoryFailure, ChampionshipRecomputeReport, EventSummary, RecomputeReport,
};
use crate::error::{Result, StorageError};
use crate::models::{Category, Event, EventResult, Heat, ScoringScheme};
use crate::repository::CompetitionStore;

/// Stored scheme of the category, or the default one with `false`.
pub async fn current_scoring_scheme(
    store: &dyn CompetitionStore,
    category_id: Uuid,
) -> Result<(ScoringScheme, bool)> {
    match store.scoring_scheme(category_id).await? {
        Some(scheme) => Ok((scheme, true)),
        None => Ok((ScoringScheme::default_for(category_id), false)),
    }
}

/// Ranks every event of the category from its raw results and stores the
/// derived rank and points.
pub async fn recompute_category(
    store: &dyn CompetitionStore,
    category_id: Uuid,
) -> Result<RecomputeReport> {
    let category = store.category(category_id).await?;

    let (scheme, stored) = current_scoring_scheme(store, category_id).await?;
    if !stored {
        warn!(%category_id, "No scoring scheme configured, storing the default one");
        store.save_scoring_scheme(&scheme).await?;
    }

    let events = store.events(category.championship_id).await?;
    let mut results_by_event: HashMap<Uuid, Vec<EventResult>> = HashMap::new();
    for result in store.category_results(category_id).await? {
        results_by_event.entry(result.event_id).or_default().push(result);
    }

    let mut summaries = Vec::with_capacity(events.len());
    let mut warnings = Vec::new();
    for event in &events {
        let results = results_by_event.remove(&event.event_id).unwrap_or_default();
        let ranking = rank_event(event, &scheme, &results);

        store
            .replace_event_scores(event.event_id, category_id, &ranking.scores)
            .await?;

        let ranked = ranking.ranked_count();
        debug!(
            %category_id,
            event_id = %event.event_id,
            ranked,
            warnings = ranking.warnings.len(),
            "Ranked event"
        );
        summaries.push(EventSummary {
            event_id: event.event_id,
            ordinal: event.ordinal,
            ranked,
            unranked: ranking.scores.len() - ranked,
        });
        warnings.extend(ranking.warnings);
    }

    let entrants = store.entrants(category_id).await?;
    let results = store.category_results(category_id).await?;
    let standings = aggregate(&entrants, &events, &results, scheme.points_order);

    info!(
        %category_id,
        events = summaries.len(),
        warnings = warnings.len(),
        "Recomputed category"
    );

    Ok(RecomputeReport {
        category_id,
        default_scheme_created: !stored,
        events: summaries,
        warnings,
        standings,
    })
}

/// Recomputes every category of a championship concurrently.
///
/// A failing category is reported and does not stop the others.
pub async fn recompute_championship(
    store: &dyn CompetitionStore,
    championship_id: Uuid,
) -> Result<ChampionshipRecomputeReport> {
    store.championship(championship_id).await?;
    let categories = store.categories(championship_id).await?;

    let outcomes = join_all(
        categories
            .iter()
            .map(|category| recompute_category(store, category.category_id)),
    )
    .await;

    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for (category, outcome) in categories.iter().zip(outcomes) {
        match outcome {
            Ok(report) => reports.push(report),
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

async fn standings_for(store: &dyn CompetitionStore, category: &Category) -> Result<(Vec<Standing>, ScoringScheme)> {
    let (scheme, _) = current_scoring_scheme(store, category.category_id).await?;
    let events = store.events(category.championship_id).await?;
    let entrants = store.entrants(category.category_id).await?;
    let results = store.category_results(category.category_id).await?;
    Ok((aggregate(&entrants, &events, &results, scheme.points_order), scheme))
}

/// Standings derived from the currently stored results; nothing is written.
pub async fn leaderboard(
    store: &dyn CompetitionStore,
    category_id: Uuid,
) -> Result<LeaderboardResponse> {
    let category = store.category(category_id).await?;
    let (standings, scheme) = standings_for(store, &category).await?;

    Ok(LeaderboardResponse {
        category_id,
        points_order: scheme.points_order,
        standings,
    })
}

/// Replaces all heats of one event for one category from current standings.
pub async fn reschedule_event(
    store: &dyn CompetitionStore,
    event_id: Uuid,
    category_id: Uuid,
) -> Result<Vec<Heat>> {
    let category = store.category(category_id).await?;
    let event = store.event(event_id).await?;
    if event.championship_id != category.championship_id {
        return Err(StorageError::ConstraintViolation(format!(
            "event {} is not part of the championship of category {}",
            event_id, category_id
        )));
    }
    schedule(store, &category, &event).await
}

/// Schedules the lowest-ordinal event that has no heats for the category yet.
pub async fn reschedule_next_event(
    store: &dyn CompetitionStore,
    category_id: Uuid,
) -> Result<(Event, Vec<Heat>)> {
    let category = store.category(category_id).await?;

    for event in store.events(category.championship_id).await? {
        if store.heats(event.event_id, category_id).await?.is_empty() {
            let heats = schedule(store, &category, &event).await?;
            return Ok((event, heats));
        }
    }

    Err(StorageError::NothingToSchedule { category_id })
}

async fn schedule(store: &dyn CompetitionStore, category: &Category, event: &Event) -> Result<Vec<Heat>> {
    let category_id = category.category_id;
    let capacity = category.heat_capacity()?;

    let existing = store.heats(event.event_id, category_id).await?;
    if existing.iter().any(Heat::has_started) {
        return Err(StorageError::HeatsAlreadyStarted {
            event_id: event.event_id,
            category_id,
        });
    }

    let results = store.category_results(category_id).await?;
    if results
        .iter()
        .any(|result| result.event_id == event.event_id && result.status.is_submitted())
    {
        return Err(StorageError::HeatsAlreadyStarted {
            event_id: event.event_id,
            category_id,
        });
    }

    let (standings, _) = standings_for(store, category).await?;
    let seeding = seeding_order(&standings);
    let planned = plan_heats(&seeding, capacity, category.heat_order);

    let heats = store
        .replace_heats(event.event_id, category_id, &planned)
        .await?;

    info!(
        %category_id,
        event_id = %event.event_id,
        entrants = seeding.len(),
        heats = heats.len(),
        capacity = capacity.get(),
        "Rescheduled heats"
    );

    Ok(heats)
}

/// Recomputes the start time of every heat of the championship and stores
/// them in one batch.
pub async fn rebuild_timetable(
    store: &dyn CompetitionStore,
    championship_id: Uuid,
) -> Result<TimetableResponse> {
    let championship = store.championship(championship_id).await?;
    let days = store.day_schedules(championship_id).await?;
    let events = store.events(championship_id).await?;
    let categories = store.categories(championship_id).await?;
    let heats = store.championship_heats(championship_id).await?;

    let starts = build_timetable(&TimetableInput {
        championship: &championship,
        days: &days,
        events: &events,
        categories: &categories,
        heats: &heats,
    })?;

    store.set_heat_start_times(&starts).await?;

    info!(%championship_id, heats = starts.len(), "Rebuilt timetable");

    Ok(TimetableResponse {
        championship_id,
        scheduled_heats: starts.len(),
        first_start: starts.iter().map(|s| s.starts_at).min(),
        last_start: starts.iter().map(|s| s.starts_at).max(),
    })
}

/// Validates and stores a scheme without touching derived results.
pub async fn store_scoring_scheme(store: &dyn CompetitionStore, scheme: &ScoringScheme) -> Result<()> {
    scheme.validate()?;
    store.category(scheme.category_id).await?;
    store.save_scoring_scheme(scheme).await?;

    info!(
        category_id = %scheme.category_id,
        preset = scheme.preset.as_str(),
        discipline = scheme.discipline.as_str(),
        "Saved scoring scheme"
    );
    Ok(())
}

/// Stores a scheme, then recomputes the category so no result keeps points
/// derived from the previous one.
pub async fn save_scoring_scheme(
    store: &dyn CompetitionStore,
    scheme: &ScoringScheme,
) -> Result<RecomputeReport> {
    store_scoring_scheme(store, scheme).await?;
    recompute_category(store, scheme.category_id).await
}
