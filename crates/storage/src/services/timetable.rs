//! Absolute start times for every heat of a championship.
//!
//! Each day is laid out from its own start time. Inside a day, events run in
//! ordinal order, categories in `position` order, heats in heat-number order.
//! The gap before a heat is measured from the end of the previous heat (its
//! start plus the event time cap) and depends on what changed:
//!
//! - same event and category: the day's heat interval
//! - new category, same event: the championship category transition
//! - new event: the championship event transition, plus the day's break when
//!   the previous event is the one the break is tagged to

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Category, Championship, DaySchedule, Event, Heat, HeatStart};

pub struct TimetableInput<'a> {
    pub championship: &'a Championship,
    pub days: &'a [DaySchedule],
    pub events: &'a [Event],
    pub categories: &'a [Category],
    pub heats: &'a [Heat],
}

struct Cursor<'a> {
    event: &'a Event,
    category_id: Uuid,
    ends_at: NaiveDateTime,
}

pub fn build_timetable(input: &TimetableInput<'_>) -> Result<Vec<HeatStart>> {
    let category_transition = input.championship.category_transition()?;
    let event_transition = input.championship.event_transition()?;

    let mut categories: Vec<&Category> = input.categories.iter().collect();
    categories.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.name.cmp(&b.name)));

    let mut heats_by_pair: HashMap<(Uuid, Uuid), Vec<&Heat>> = HashMap::new();
    for heat in input.heats {
        heats_by_pair
            .entry((heat.event_id, heat.category_id))
            .or_default()
            .push(heat);
    }
    for heats in heats_by_pair.values_mut() {
        heats.sort_by_key(|heat| heat.heat_number);
    }

    let mut days: Vec<i32> = input.events.iter().map(|event| event.day_number).collect();
    days.sort_unstable();
    days.dedup();

    let mut starts = Vec::with_capacity(input.heats.len());
    for day_number in days {
        let mut events: Vec<&Event> = input
            .events
            .iter()
            .filter(|event| event.day_number == day_number)
            .collect();
        events.sort_by_key(|event| (event.ordinal, event.event_id));

        let has_heats = events.iter().any(|event| {
            categories
                .iter()
                .any(|category| heats_by_pair.contains_key(&(event.event_id, category.category_id)))
        });
        if !has_heats {
            continue;
        }

        let day = input
            .days
            .iter()
            .find(|day| day.day_number == day_number)
            .ok_or_else(|| {
                StorageError::InvalidConfiguration(format!(
                    "no day schedule configured for day {}",
                    day_number
                ))
            })?;
        let heat_interval = day.heat_interval()?;

        let mut cursor: Option<Cursor<'_>> = None;
        for event in &events {
            let duration = event.heat_duration()?;
            for category in &categories {
                let Some(heats) = heats_by_pair.get(&(event.event_id, category.category_id)) else {
                    continue;
                };
                for heat in heats {
                    let starts_at = match &cursor {
                        None => day.starts_at(),
                        Some(previous) => {
                            previous.ends_at
                                + gap(
                                    previous,
                                    event,
                                    category.category_id,
                                    day,
                                    heat_interval,
                                    category_transition,
                                    event_transition,
                                )?
                        }
                    };
                    starts.push(HeatStart {
                        heat_id: heat.heat_id,
                        starts_at,
                    });
                    cursor = Some(Cursor {
                        event,
                        category_id: category.category_id,
                        ends_at: starts_at + duration,
                    });
                }
            }
        }
        debug!(day_number, heats = starts.len(), "Laid out competition day");
    }

    Ok(starts)
}

fn gap(
    previous: &Cursor<'_>,
    event: &Event,
    category_id: Uuid,
    day: &DaySchedule,
    heat_interval: Duration,
    category_transition: Duration,
    event_transition: Duration,
) -> Result<Duration> {
    if previous.event.event_id != event.event_id {
        let pause = day
            .break_between(previous.event.ordinal, event.ordinal)?
            .unwrap_or_else(Duration::zero);
        return Ok(event_transition + pause);
    }
    if previous.category_id != category_id {
        return Ok(category_transition);
    }
    Ok(heat_interval)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::models::{BreakWindow, EntryFormat, HeatOrder, ResultType};

    const CHAMPIONSHIP: u128 = 1;

    fn championship(category_transition: i32, event_transition: i32) -> Championship {
        Championship {
            championship_id: Uuid::from_u128(CHAMPIONSHIP),
            name: "Open".to_string(),
            category_transition_minutes: category_transition,
            event_transition_minutes: event_transition,
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn day(day_number: i32, interval: i32, break_window: BreakWindow) -> DaySchedule {
        DaySchedule {
            championship_id: Uuid::from_u128(CHAMPIONSHIP),
            day_number,
            date: NaiveDate::from_ymd_opt(2025, 6, day_number as u32).unwrap(),
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            heat_interval_minutes: interval,
            break_window,
        }
    }

    fn event(id: u128, ordinal: i32, day_number: i32, time_cap: Option<i32>) -> Event {
        Event {
            event_id: Uuid::from_u128(id),
            championship_id: Uuid::from_u128(CHAMPIONSHIP),
            name: format!("WOD {}", ordinal),
            ordinal,
            result_type: ResultType::ElapsedTime,
            day_number,
            time_cap_minutes: time_cap,
        }
    }

    fn category(id: u128, position: i32) -> Category {
        Category {
            category_id: Uuid::from_u128(id),
            championship_id: Uuid::from_u128(CHAMPIONSHIP),
            name: format!("Category {}", id),
            entry_format: EntryFormat::Individual,
            heat_capacity: 8,
            heat_order: HeatOrder::StandingsFirst,
            position,
        }
    }

    fn heat(id: u128, event: u128, category: u128, number: u32) -> Heat {
        Heat {
            heat_id: Uuid::from_u128(id),
            event_id: Uuid::from_u128(event),
            category_id: Uuid::from_u128(category),
            heat_number: number,
            capacity: 8,
            scheduled_at: None,
            started_at: None,
            assignments: Vec::new(),
        }
    }

    fn clock(starts: &[HeatStart], heat_id: u128) -> String {
        starts
            .iter()
            .find(|s| s.heat_id == Uuid::from_u128(heat_id))
            .map(|s| s.starts_at.format("%d %H:%M").to_string())
            .unwrap_or_default()
    }

    #[test]
    fn test_heats_step_by_exact_interval_without_time_cap() {
        let heats = vec![heat(10, 100, 50, 1), heat(11, 100, 50, 2), heat(12, 100, 50, 3)];
        let starts = build_timetable(&TimetableInput {
            championship: &championship(0, 0),
            days: &[day(1, 15, BreakWindow::default())],
            events: &[event(100, 1, 1, None)],
            categories: &[category(50, 1)],
            heats: &heats,
        })
        .unwrap();

        assert_eq!(starts.len(), 3);
        for pair in starts.windows(2) {
            assert_eq!(pair[1].starts_at - pair[0].starts_at, Duration::minutes(15));
        }
        assert_eq!(clock(&starts, 10), "01 08:00");
    }

    #[test]
    fn test_start_times_never_decrease() {
        let heats: Vec<Heat> = (1..=6).map(|n| heat(10 + n as u128, 100, 50, n)).collect();
        let starts = build_timetable(&TimetableInput {
            championship: &championship(5, 5),
            days: &[day(1, 0, BreakWindow::default())],
            events: &[event(100, 1, 1, Some(0))],
            categories: &[category(50, 1)],
            heats: &heats,
        })
        .unwrap();

        assert!(starts.windows(2).all(|pair| pair[0].starts_at <= pair[1].starts_at));
        assert_eq!(clock(&starts, 16), "01 08:00");
    }

    #[test]
    fn test_offsets_accumulate_from_end_of_previous_heat() {
        // Two events of 10 minutes, two categories, a 30 minute break after event 1.
        let heats = vec![
            heat(10, 100, 51, 2),
            heat(11, 100, 51, 1),
            heat(12, 100, 50, 1),
            heat(13, 101, 50, 1),
        ];
        let break_window = BreakWindow {
            enabled: true,
            duration_minutes: 30,
            after_event_ordinal: 1,
        };
        let starts = build_timetable(&TimetableInput {
            championship: &championship(4, 6),
            days: &[day(1, 2, break_window)],
            events: &[event(101, 2, 1, Some(10)), event(100, 1, 1, Some(10))],
            categories: &[category(51, 2), category(50, 1)],
            heats: &heats,
        })
        .unwrap();

        assert_eq!(clock(&starts, 12), "01 08:00");
        // category change: 08:10 + 4
        assert_eq!(clock(&starts, 11), "01 08:14");
        // same category: 08:24 + 2
        assert_eq!(clock(&starts, 10), "01 08:26");
        // next event: 08:36 + 6 + 30
        assert_eq!(clock(&starts, 13), "01 09:12");
    }

    #[test]
    fn test_disabled_break_is_ignored() {
        let heats = vec![heat(10, 100, 50, 1), heat(11, 101, 50, 1)];
        let break_window = BreakWindow {
            enabled: false,
            duration_minutes: 30,
            after_event_ordinal: 1,
        };
        let starts = build_timetable(&TimetableInput {
            championship: &championship(0, 0),
            days: &[day(1, 5, break_window)],
            events: &[event(100, 1, 1, Some(12)), event(101, 2, 1, Some(12))],
            categories: &[category(50, 1)],
            heats: &heats,
        })
        .unwrap();
        assert_eq!(clock(&starts, 11), "01 08:12");
    }

    #[test]
    fn test_break_survives_when_its_event_has_no_heats() {
        let heats = vec![heat(10, 100, 50, 1), heat(12, 102, 50, 1)];
        let break_window = BreakWindow {
            enabled: true,
            duration_minutes: 60,
            after_event_ordinal: 2,
        };
        let starts = build_timetable(&TimetableInput {
            championship: &championship(0, 0),
            days: &[day(1, 0, break_window)],
            events: &[
                event(100, 1, 1, Some(10)),
                event(101, 2, 1, Some(10)),
                event(102, 3, 1, Some(10)),
            ],
            categories: &[category(50, 1)],
            heats: &heats,
        })
        .unwrap();

        assert_eq!(clock(&starts, 10), "01 08:00");
        assert_eq!(clock(&starts, 12), "01 09:10");
    }

    #[test]
    fn test_each_day_starts_from_its_own_start_time() {
        let heats = vec![heat(10, 100, 50, 1), heat(11, 100, 50, 2), heat(12, 101, 50, 1)];
        let starts = build_timetable(&TimetableInput {
            championship: &championship(0, 10),
            days: &[day(1, 3, BreakWindow::default()), day(2, 3, BreakWindow::default())],
            events: &[event(100, 1, 1, Some(20)), event(101, 2, 2, Some(20))],
            categories: &[category(50, 1)],
            heats: &heats,
        })
        .unwrap();

        assert_eq!(clock(&starts, 11), "01 08:23");
        assert_eq!(clock(&starts, 12), "02 08:00");
    }

    #[test]
    fn test_missing_day_schedule_is_rejected() {
        let heats = vec![heat(10, 100, 50, 1)];
        let err = build_timetable(&TimetableInput {
            championship: &championship(0, 0),
            days: &[],
            events: &[event(100, 1, 3, None)],
            categories: &[category(50, 1)],
            heats: &heats,
        })
        .unwrap_err();
        assert!(matches!(err, StorageError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_negative_interval_is_rejected() {
        let heats = vec![heat(10, 100, 50, 1)];
        let err = build_timetable(&TimetableInput {
            championship: &championship(0, 0),
            days: &[day(1, -5, BreakWindow::default())],
            events: &[event(100, 1, 1, None)],
            categories: &[category(50, 1)],
            heats: &heats,
        })
        .unwrap_err();
        assert!(err.to_string().contains("heat interval"));
    }
}
