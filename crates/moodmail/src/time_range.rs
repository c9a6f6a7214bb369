//! Inclusive creation-time window shared by every aggregation query.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use thiserror::Error;

use crate::db::format_timestamp;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Invalid time bound '{value}': expected RFC 3339, 'YYYY-MM-DD HH:MM:SS' or 'YYYY-MM-DD'")]
pub struct InvalidTimeBound {
    pub value: String,
}

/// Optional lower and upper bounds on `created_at`, both inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Parses raw `startTime` / `endTime` query values. Empty strings count
    /// as absent.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, InvalidTimeBound> {
        Ok(Self {
            start: parse_optional(start)?,
            end: parse_optional(end)?,
        })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| at >= s) && self.end.map_or(true, |e| at <= e)
    }

    /// Appends SQL conditions for this range on `column`, numbering
    /// placeholders after the values already in `params`.
    pub(crate) fn push_conditions(
        &self,
        column: &str,
        conditions: &mut Vec<String>,
        params: &mut Vec<Box<dyn rusqlite::types::ToSql>>,
    ) {
        let (start, end) = self.stored_bounds();
        if let Some(start) = start {
            conditions.push(format!("{} >= ?{}", column, params.len() + 1));
            params.push(Box::new(start));
        }
        if let Some(end) = end {
            conditions.push(format!("{} <= ?{}", column, params.len() + 1));
            params.push(Box::new(end));
        }
    }

    /// Bounds in the stored millisecond format. A start with sub-millisecond
    /// precision rounds up and an end rounds down, so the stored comparison
    /// never admits a value outside the range.
    fn stored_bounds(&self) -> (Option<String>, Option<String>) {
        let start = self.start.map(|s| {
            let truncated = s.trunc_subsecs(3);
            if truncated < s {
                format_timestamp(truncated + Duration::milliseconds(1))
            } else {
                format_timestamp(truncated)
            }
        });
        let end = self.end.map(|e| format_timestamp(e.trunc_subsecs(3)));
        (start, end)
    }
}

fn parse_optional(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, InvalidTimeBound> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_time_bound(value).map(Some),
    }
}

/// Parses a single bound. Naive values are taken as UTC; a bare date is
/// midnight UTC.
pub fn parse_time_bound(value: &str) -> Result<DateTime<Utc>, InvalidTimeBound> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(InvalidTimeBound {
        value: value.to_string(),
    })
}
