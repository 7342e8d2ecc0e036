use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use super::result_normalizer::{ComparableValue, InvalidResult, normalize};
use crate::models::{Event, EventResult, RankingDiscipline, ResultScore, ResultStatus, ScoringScheme};

/// A result that was left out of the ranking, or ranked without its tie-break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResultWarning {
    pub event_id: Uuid,
    pub entrant_id: Uuid,
    pub message: String,
}

/// Rank and points of every result of one event within one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRanking {
    pub event_id: Uuid,
    /// Ranked entrants in rank order, then everyone else by entrant id.
    pub scores: Vec<ResultScore>,
    pub warnings: Vec<ResultWarning>,
}

impl EventRanking {
    pub fn ranked_count(&self) -> usize {
        self.scores.iter().filter(|score| score.rank.is_some()).count()
    }
}

struct Performance {
    entrant_id: Uuid,
    primary: ComparableValue,
    tiebreak: Option<ComparableValue>,
}

impl Performance {
    /// `None` orders below any value, so a missing tie-break loses the tie.
    fn key(&self) -> (ComparableValue, Option<ComparableValue>) {
        (self.primary, self.tiebreak)
    }

    fn better_first(a: &Self, b: &Self) -> Ordering {
        b.key().cmp(&a.key()).then_with(|| a.entrant_id.cmp(&b.entrant_id))
    }
}

/// Ranks one event's results for one category.
///
/// Depends on nothing but its arguments: previously derived ranks and points
/// on `results` are ignored, so running it again over the same raw results
/// gives the same answer.
pub fn rank_event(event: &Event, scheme: &ScoringScheme, results: &[EventResult]) -> EventRanking {
    let mut warnings = Vec::new();
    let mut performances = Vec::new();
    let mut unranked = Vec::new();

    for result in results {
        let fixed_points = match result.status {
            ResultStatus::NonFinish => Some(scheme.non_finish_points),
            ResultStatus::NoShow => Some(scheme.no_show_points),
            ResultStatus::Pending => None,
            ResultStatus::Completed => {
                let primary = result
                    .raw_value
                    .as_deref()
                    .map_or(Err(InvalidResult::Empty), |raw| normalize(raw, event.result_type));

                match primary {
                    Ok(primary) => {
                        let tiebreak = result
                            .tiebreak_value
                            .as_deref()
                            .map(str::trim)
                            .filter(|raw| !raw.is_empty())
                            .and_then(|raw| match normalize(raw, event.result_type) {
                                Ok(value) => Some(value),
                                Err(reason) => {
                                    warnings.push(warning(event, result, "tie-break", &reason));
                                    None
                                }
                            });
                        performances.push(Performance {
                            entrant_id: result.entrant_id,
                            primary,
                            tiebreak,
                        });
                        continue;
                    }
                    Err(reason) => {
                        warnings.push(warning(event, result, "result", &reason));
                        None
                    }
                }
            }
        };

        unranked.push(ResultScore {
            entrant_id: result.entrant_id,
            rank: None,
            points: fixed_points,
        });
    }

    performances.sort_by(Performance::better_first);

    let mut scores = Vec::with_capacity(results.len());
    let mut rank = 0u32;
    for (index, performance) in performances.iter().enumerate() {
        let tied = index > 0 && performances[index - 1].key() == performance.key();
        if !tied {
            rank = match scheme.discipline {
                RankingDiscipline::Standard => index as u32 + 1,
                RankingDiscipline::Dense => rank + 1,
            };
        }
        scores.push(ResultScore {
            entrant_id: performance.entrant_id,
            rank: Some(rank),
            points: Some(scheme.points_for_rank(rank)),
        });
    }

    unranked.sort_by_key(|score| score.entrant_id);
    scores.extend(unranked);

    EventRanking {
        event_id: event.event_id,
        scores,
        warnings,
    }
}

fn warning(event: &Event, result: &EventResult, field: &str, reason: &InvalidResult) -> ResultWarning {
    warn!(
        event_id = %event.event_id,
        entrant_id = %result.entrant_id,
        "Ignoring malformed {}: {}",
        field,
        reason
    );
    ResultWarning {
        event_id: event.event_id,
        entrant_id: result.entrant_id,
        message: format!("{} ignored: {}", field, reason),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::{PointsPreset, ResultType};

    fn event(result_type: ResultType) -> Event {
        Event {
            event_id: Uuid::from_u128(1),
            championship_id: Uuid::from_u128(2),
            name: "Fran".to_string(),
            ordinal: 1,
            result_type,
            day_number: 1,
            time_cap_minutes: None,
        }
    }

    fn result(id: u128, status: ResultStatus, raw: Option<&str>, tiebreak: Option<&str>) -> EventResult {
        EventResult {
            event_id: Uuid::from_u128(1),
            entrant_id: Uuid::from_u128(id),
            category_id: Uuid::from_u128(3),
            raw_value: raw.map(str::to_string),
            tiebreak_value: tiebreak.map(str::to_string),
            status,
            rank: None,
            points: None,
            updated_at: NaiveDate::from_ymd_opt(2025, 3, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }
    }

    fn completed(id: u128, raw: &str) -> EventResult {
        result(id, ResultStatus::Completed, Some(raw), None)
    }

    fn scheme(discipline: RankingDiscipline) -> ScoringScheme {
        ScoringScheme {
            discipline,
            ..ScoringScheme::default_for(Uuid::from_u128(3))
        }
    }

    fn rank_of(ranking: &EventRanking, id: u128) -> Option<u32> {
        ranking
            .scores
            .iter()
            .find(|score| score.entrant_id == Uuid::from_u128(id))
            .and_then(|score| score.rank)
    }

    fn ranks_in_order(ranking: &EventRanking) -> Vec<u32> {
        ranking.scores.iter().filter_map(|score| score.rank).collect()
    }

    #[test]
    fn test_distinct_values_rank_by_count_of_better_entries() {
        let results = vec![
            completed(10, "120"),
            completed(11, "150"),
            completed(12, "90"),
            completed(13, "131"),
        ];
        for discipline in [RankingDiscipline::Standard, RankingDiscipline::Dense] {
            let ranking = rank_event(&event(ResultType::RepetitionCount), &scheme(discipline), &results);
            assert_eq!(rank_of(&ranking, 11), Some(1));
            assert_eq!(rank_of(&ranking, 13), Some(2));
            assert_eq!(rank_of(&ranking, 10), Some(3));
            assert_eq!(rank_of(&ranking, 12), Some(4));
        }
    }

    #[test]
    fn test_standard_ranking_skips_after_ties() {
        let results = vec![
            completed(1, "100"),
            completed(2, "100"),
            completed(3, "100"),
            completed(4, "80"),
        ];
        let ranking = rank_event(&event(ResultType::Load), &scheme(RankingDiscipline::Standard), &results);
        assert_eq!(ranks_in_order(&ranking), vec![1, 1, 1, 4]);
        assert_eq!(ranking.scores[3].points, Some(Decimal::from(91)));
    }

    #[test]
    fn test_dense_ranking_increments_after_ties() {
        let results = vec![
            completed(1, "100"),
            completed(2, "100"),
            completed(3, "100"),
            completed(4, "80"),
        ];
        let ranking = rank_event(&event(ResultType::Load), &scheme(RankingDiscipline::Dense), &results);
        assert_eq!(ranks_in_order(&ranking), vec![1, 1, 1, 2]);
        assert_eq!(ranking.scores[3].points, Some(Decimal::from(97)));
    }

    #[test]
    fn test_time_tie_broken_by_lower_tiebreak() {
        let results = vec![
            result(1, ResultStatus::Completed, Some("05:00"), Some("12")),
            result(2, ResultStatus::Completed, Some("05:00"), Some("10")),
        ];
        let ranking = rank_event(
            &event(ResultType::ElapsedTime),
            &scheme(RankingDiscipline::Standard),
            &results,
        );
        assert_eq!(rank_of(&ranking, 2), Some(1));
        assert_eq!(rank_of(&ranking, 1), Some(2));
        assert_eq!(ranking.scores[0].points, Some(Decimal::from(100)));
        assert_eq!(ranking.scores[1].points, Some(Decimal::from(97)));
    }

    #[test]
    fn test_reps_tiebreak_uses_same_direction() {
        let results = vec![
            result(1, ResultStatus::Completed, Some("150"), Some("30")),
            result(2, ResultStatus::Completed, Some("150"), Some("35")),
        ];
        let ranking = rank_event(
            &event(ResultType::RepetitionCount),
            &scheme(RankingDiscipline::Standard),
            &results,
        );
        assert_eq!(rank_of(&ranking, 2), Some(1));
        assert_eq!(rank_of(&ranking, 1), Some(2));
    }

    #[test]
    fn test_missing_tiebreak_sorts_after_present_one() {
        let results = vec![
            result(1, ResultStatus::Completed, Some("4:00"), None),
            result(2, ResultStatus::Completed, Some("4:00"), Some("59")),
            result(3, ResultStatus::Completed, Some("4:00"), None),
        ];
        let ranking = rank_event(
            &event(ResultType::ElapsedTime),
            &scheme(RankingDiscipline::Standard),
            &results,
        );
        assert_eq!(rank_of(&ranking, 2), Some(1));
        assert_eq!(rank_of(&ranking, 1), Some(2));
        assert_eq!(rank_of(&ranking, 3), Some(2));
    }

    #[test]
    fn test_non_finish_and_no_show_take_fixed_points() {
        let mut scoring = scheme(RankingDiscipline::Standard);
        scoring.non_finish_points = Decimal::from(7);
        scoring.no_show_points = Decimal::from(3);

        let results = vec![
            completed(1, "10:00"),
            result(2, ResultStatus::NonFinish, Some("12:00"), None),
            result(3, ResultStatus::NoShow, None, None),
        ];
        let ranking = rank_event(&event(ResultType::ElapsedTime), &scoring, &results);

        let dnf = ranking.scores.iter().find(|s| s.entrant_id == Uuid::from_u128(2)).unwrap();
        let dns = ranking.scores.iter().find(|s| s.entrant_id == Uuid::from_u128(3)).unwrap();
        assert_eq!((dnf.rank, dnf.points), (None, Some(Decimal::from(7))));
        assert_eq!((dns.rank, dns.points), (None, Some(Decimal::from(3))));
        assert_eq!(rank_of(&ranking, 1), Some(1));
    }

    #[test]
    fn test_malformed_and_pending_results_are_left_unscored() {
        let results = vec![
            completed(1, "abc"),
            result(2, ResultStatus::Completed, None, None),
            result(3, ResultStatus::Pending, None, None),
            completed(4, "42"),
        ];
        let ranking = rank_event(
            &event(ResultType::RepetitionCount),
            &scheme(RankingDiscipline::Standard),
            &results,
        );
        assert_eq!(ranking.ranked_count(), 1);
        assert_eq!(rank_of(&ranking, 4), Some(1));
        for id in [1, 2, 3] {
            let score = ranking.scores.iter().find(|s| s.entrant_id == Uuid::from_u128(id)).unwrap();
            assert_eq!((score.rank, score.points), (None, None));
        }
        assert_eq!(ranking.warnings.len(), 2);
        assert!(ranking.warnings.iter().all(|w| w.event_id == Uuid::from_u128(1)));
    }

    #[test]
    fn test_malformed_tiebreak_is_dropped_with_warning() {
        let results = vec![
            result(1, ResultStatus::Completed, Some("200"), Some("lots")),
            result(2, ResultStatus::Completed, Some("200"), Some("5")),
        ];
        let ranking = rank_event(&event(ResultType::Load), &scheme(RankingDiscipline::Standard), &results);
        assert_eq!(rank_of(&ranking, 2), Some(1));
        assert_eq!(rank_of(&ranking, 1), Some(2));
        assert_eq!(ranking.warnings.len(), 1);
        assert!(ranking.warnings[0].message.starts_with("tie-break"));
    }

    #[test]
    fn test_linear_preset_fifth_of_eight() {
        let scoring = ScoringScheme::from_preset(Uuid::from_u128(3), PointsPreset::Linear, 8).unwrap();
        let results: Vec<EventResult> = (1..=8u128)
            .map(|id| completed(id, &(100 - id).to_string()))
            .collect();
        let ranking = rank_event(&event(ResultType::RepetitionCount), &scoring, &results);
        let fifth = ranking.scores.iter().find(|s| s.entrant_id == Uuid::from_u128(5)).unwrap();
        assert_eq!(fifth.rank, Some(5));
        assert_eq!(fifth.points, Some(scoring.table.points(5)));
        assert_eq!(fifth.points, Some(Decimal::from(5)));
    }

    #[test]
    fn test_reranking_ignores_previous_derived_values() {
        let mut results = vec![completed(1, "3:10"), completed(2, "3:05")];
        let scoring = scheme(RankingDiscipline::Standard);
        let first = rank_event(&event(ResultType::ElapsedTime), &scoring, &results);

        results[0].rank = Some(1);
        results[0].points = Some(Decimal::from(100));
        let second = rank_event(&event(ResultType::ElapsedTime), &scoring, &results);
        assert_eq!(first, second);
    }
}
