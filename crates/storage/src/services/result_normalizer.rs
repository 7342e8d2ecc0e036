//! Turns raw result strings into values that compare the same way for every
//! result type.
//!
//! Elapsed times are negated, so for any two normalized values of one event the
//! greater one is the better performance. Nothing here panics: malformed input
//! comes back as [`InvalidResult`] and is skipped by the ranking.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::ResultType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidResult {
    #[error("no value recorded")]
    Empty,

    #[error("'{0}' is not a valid time, expected mm:ss, h:mm:ss or seconds")]
    MalformedTime(String),

    #[error("'{0}' is not a non-negative number")]
    MalformedNumber(String),
}

/// A normalized result: greater is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComparableValue(Decimal);

impl ComparableValue {
    /// The value as recorded (seconds, reps or load), without the sign flip.
    pub fn magnitude(&self) -> Decimal {
        self.0.abs()
    }
}

pub fn normalize(raw: &str, result_type: ResultType) -> Result<ComparableValue, InvalidResult> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(InvalidResult::Empty);
    }

    match result_type {
        ResultType::ElapsedTime => parse_elapsed_seconds(raw).map(|seconds| ComparableValue(-seconds)),
        ResultType::RepetitionCount | ResultType::Load => {
            parse_non_negative(raw).map(ComparableValue)
        }
    }
}

/// Total seconds of `mm:ss`, `h:mm:ss` or a bare number of seconds.
pub fn parse_elapsed_seconds(raw: &str) -> Result<Decimal, InvalidResult> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(InvalidResult::Empty);
    }
    let malformed = || InvalidResult::MalformedTime(raw.to_string());

    let parts: Vec<&str> = raw.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [seconds] => {
            return parse_non_negative(seconds).map_err(|_| malformed());
        }
        [minutes, seconds] => ("0", *minutes, *seconds),
        [hours, minutes, seconds] if minutes.len() == 2 => (*hours, *minutes, *seconds),
        _ => return Err(malformed()),
    };

    let hours = parse_whole(hours).ok_or_else(malformed)?;
    let minutes = parse_whole(minutes).ok_or_else(malformed)?;
    if parts.len() == 3 && minutes >= Decimal::from(60) {
        return Err(malformed());
    }

    let whole_seconds = seconds.split('.').next().unwrap_or_default();
    if whole_seconds.len() != 2 {
        return Err(malformed());
    }
    let seconds = parse_non_negative(seconds).map_err(|_| malformed())?;
    if seconds >= Decimal::from(60) {
        return Err(malformed());
    }

    Ok(hours * Decimal::from(3600) + minutes * Decimal::from(60) + seconds)
}

fn parse_whole(digits: &str) -> Option<Decimal> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Decimal::from_str(digits).ok()
}

fn parse_non_negative(raw: &str) -> Result<Decimal, InvalidResult> {
    let malformed = || InvalidResult::MalformedNumber(raw.to_string());

    let mut dots = 0;
    let well_formed = !raw.is_empty()
        && raw.bytes().all(|b| {
            if b == b'.' {
                dots += 1;
                true
            } else {
                b.is_ascii_digit()
            }
        })
        && dots <= 1
        && raw.bytes().any(|b| b.is_ascii_digit());
    if !well_formed {
        return Err(malformed());
    }

    Decimal::from_str(raw).map_err(|_| malformed())
}
