//! Timestamps are naive UTC date-times with microsecond precision.
//!
//! They render as `YYYY-MM-DDTHH:MM:SS[.ffffff]` with no offset. Input is
//! accepted in the common ISO-8601 shapes clients send.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, TimeDelta, Utc};

use crate::DomainError;

pub type Timestamp = NaiveDateTime;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Current UTC time truncated to microseconds.
pub fn now() -> Timestamp {
    Utc::now().naive_utc().trunc_subsecs(6)
}

/// Parses an ISO-8601 timestamp.
///
/// Values carrying an offset (`Z`, `+09:00`) are converted to UTC. A bare
/// date means midnight of that day.
pub fn parse_timestamp(input: &str) -> Result<Timestamp, DomainError> {
    let raw = input.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(with_offset.naive_utc().trunc_subsecs(6));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.trunc_subsecs(6));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN))
        .map_err(|_| DomainError::InvalidTimestamp(input.to_string()))
}

/// Next `updated_at` for a record last touched at `previous`.
///
/// Always strictly later than `previous`, even when the clock has not moved.
pub fn advance(previous: Timestamp) -> Timestamp {
    let current = now();
    let floor = previous + TimeDelta::microseconds(1);
    current.max(floor)
}
