//! Query window resolution shared by the logs and metrics tools.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use thiserror::Error;

pub const DEFAULT_LOOKBACK_MINUTES: u32 = 15;

/// Naive layouts accepted in addition to RFC 3339. Naive times are UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeRangeError {
    #[error("invalid ISO-8601 timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("look-back window of {0} minutes is out of range")]
    WindowOutOfRange(u32),

    #[error("start time {start} is after end time {end}")]
    Inverted { start: String, end: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn start_iso(&self) -> String {
        format_timestamp(&self.start)
    }

    pub fn end_iso(&self) -> String {
        format_timestamp(&self.end)
    }
}

/// Resolve a query window relative to the current time.
///
/// `end` defaults to now; `start` defaults to `minutes` before `end`.
/// Explicit values always win over `minutes`.
pub fn resolve_time_range(
    start: Option<&str>,
    end: Option<&str>,
    minutes: u32,
) -> Result<TimeRange, TimeRangeError> {
    resolve_time_range_at(Utc::now(), start, end, minutes)
}

pub fn resolve_time_range_at(
    now: DateTime<Utc>,
    start: Option<&str>,
    end: Option<&str>,
    minutes: u32,
) -> Result<TimeRange, TimeRangeError> {
    let end = match non_empty(end) {
        Some(raw) => parse_timestamp(raw)?,
        None => now,
    };

    let start = match non_empty(start) {
        Some(raw) => parse_timestamp(raw)?,
        None => {
            let window = TimeDelta::try_minutes(i64::from(minutes))
                .ok_or(TimeRangeError::WindowOutOfRange(minutes))?;
            end.checked_sub_signed(window)
                .ok_or(TimeRangeError::WindowOutOfRange(minutes))?
        }
    };

    if start > end {
        return Err(TimeRangeError::Inverted {
            start: format_timestamp(&start),
            end: format_timestamp(&end),
        });
    }

    Ok(TimeRange { start, end })
}

/// Parse an ISO-8601 timestamp: RFC 3339 with offset, a naive date-time,
/// or a bare date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimeRangeError> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimeRangeError::InvalidTimestamp(raw.to_string()))
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
