//! Aggregate queries over stored emotion logs.
//!
//! Every query takes a [`TimeRange`] and filters on `created_at` with bound
//! parameters; the range is never spliced into SQL text.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::types::ToSql;
use serde::Serialize;

use super::emotion_log_repo::timestamp_column;
use super::{format_timestamp, Database, DatabaseError};
use crate::time_range::TimeRange;

/// Time bucket for period summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

impl Granularity {
    /// Parses the `mode` query value. Anything unrecognised means `day`.
    pub fn from_mode(mode: Option<&str>) -> Self {
        match mode.map(|m| m.trim().to_ascii_lowercase()).as_deref() {
            Some("week") => Granularity::Week,
            Some("month") => Granularity::Month,
            _ => Granularity::Day,
        }
    }

    /// SQL expression truncating `created_at` to the start of its bucket,
    /// rendered in the stored timestamp format. Weeks start on Monday.
    fn bucket_expr(&self) -> &'static str {
        match self {
            Granularity::Day => "strftime('%Y-%m-%dT00:00:00.000Z', created_at)",
            Granularity::Week => {
                "strftime('%Y-%m-%dT00:00:00.000Z', created_at, 'weekday 0', '-6 days')"
            }
            Granularity::Month => "strftime('%Y-%m-01T00:00:00.000Z', created_at)",
        }
    }
}

/// Number of logs per emotion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmotionCount {
    pub emotion: String,
    pub count: i64,
}

/// Number of logs per emotion within one time bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    /// Bucket start, in the stored timestamp format.
    pub bucket: String,
    pub emotion: String,
    pub count: i64,
}

/// Number of logs per emotion on one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEmotionCount {
    pub day: NaiveDate,
    pub emotion: String,
    pub count: i64,
}

/// Projection used by the "all emotions" listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionEntry {
    pub id: String,
    pub emotion: String,
    pub email_subject: String,
    pub created_at: DateTime<Utc>,
}

/// The record reported for a day's predominant emotion.
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleLog {
    pub email_subject: String,
    pub emotion: String,
    pub priority: i64,
    pub created_at: DateTime<Utc>,
}

/// Most recent log in range.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestLog {
    pub emotion: String,
    pub created_at: DateTime<Utc>,
}

/// Builds `WHERE ...` for the range plus any extra conditions already
/// pushed by the caller.
fn where_clause(
    range: &TimeRange,
    mut conditions: Vec<String>,
    params: &mut Vec<Box<dyn ToSql>>,
) -> String {
    range.push_conditions("created_at", &mut conditions, params);
    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

fn param_refs(params: &[Box<dyn ToSql>]) -> Vec<&dyn ToSql> {
    params.iter().map(|p| p.as_ref()).collect()
}

/// Counts logs per emotion, largest count first.
pub fn count_by_emotion(db: &Database, range: &TimeRange) -> Result<Vec<EmotionCount>, DatabaseError> {
    db.with_conn(|conn| {
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();
        let where_sql = where_clause(range, Vec::new(), &mut params);
        let sql = format!(
            "SELECT emotion, COUNT(*) FROM emotion_logs {}
             GROUP BY emotion ORDER BY COUNT(*) DESC, emotion",
            where_sql
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(param_refs(&params).as_slice(), |row| {
                Ok(EmotionCount {
                    emotion: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Counts logs per bucket and emotion, newest bucket first.
pub fn count_by_bucket(
    db: &Database,
    range: &TimeRange,
    granularity: Granularity,
) -> Result<Vec<BucketCount>, DatabaseError> {
    db.with_conn(|conn| {
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();
        let where_sql = where_clause(range, Vec::new(), &mut params);
        let sql = format!(
            "SELECT {} AS bucket, emotion, COUNT(*) FROM emotion_logs {}
             GROUP BY bucket, emotion ORDER BY bucket DESC, COUNT(*) DESC, emotion",
            granularity.bucket_expr(),
            where_sql
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(param_refs(&params).as_slice(), |row| {
                Ok(BucketCount {
                    bucket: row.get(0)?,
                    emotion: row.get(1)?,
                    count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Counts logs per calendar day and emotion, oldest day first.
pub fn count_by_day(db: &Database, range: &TimeRange) -> Result<Vec<DayEmotionCount>, DatabaseError> {
    db.with_conn(|conn| {
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();
        let where_sql = where_clause(range, Vec::new(), &mut params);
        let sql = format!(
            "SELECT substr(created_at, 1, 10) AS day, emotion, COUNT(*) FROM emotion_logs {}
             GROUP BY day, emotion ORDER BY day ASC, COUNT(*) DESC",
            where_sql
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(param_refs(&params).as_slice(), |row| {
                let day: String = row.get(0)?;
                let day = NaiveDate::parse_from_str(&day, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        0,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                Ok(DayEmotionCount {
                    day,
                    emotion: row.get(1)?,
                    count: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Earliest log with `emotion` on `day` that also falls inside `range`.
pub fn first_on_day(
    db: &Database,
    day: NaiveDate,
    emotion: &str,
    range: &TimeRange,
) -> Result<Option<ExampleLog>, DatabaseError> {
    let day_start = day.and_hms_opt(0, 0, 0).map(|d| d.and_utc());
    let Some(day_start) = day_start else {
        return Ok(None);
    };
    let next_day = day_start + Duration::days(1);

    db.with_conn(|conn| {
        let mut params: Vec<Box<dyn ToSql>> = vec![
            Box::new(emotion.to_string()),
            Box::new(format_timestamp(day_start)),
            Box::new(format_timestamp(next_day)),
        ];
        let conditions = vec![
            "emotion = ?1".to_string(),
            "created_at >= ?2".to_string(),
            "created_at < ?3".to_string(),
        ];
        let where_sql = where_clause(range, conditions, &mut params);
        let sql = format!(
            "SELECT email_subject, emotion, priority, created_at FROM emotion_logs {}
             ORDER BY created_at ASC LIMIT 1",
            where_sql
        );

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(param_refs(&params).as_slice(), |row| {
            Ok(ExampleLog {
                email_subject: row.get("email_subject")?,
                emotion: row.get("emotion")?,
                priority: row.get("priority")?,
                created_at: timestamp_column(row, "created_at")?,
            })
        })?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Most recent log in range.
pub fn latest(db: &Database, range: &TimeRange) -> Result<Option<LatestLog>, DatabaseError> {
    db.with_conn(|conn| {
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();
        let where_sql = where_clause(range, Vec::new(), &mut params);
        let sql = format!(
            "SELECT emotion, created_at FROM emotion_logs {}
             ORDER BY created_at DESC LIMIT 1",
            where_sql
        );

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query_map(param_refs(&params).as_slice(), |row| {
            Ok(LatestLog {
                emotion: row.get("emotion")?,
                created_at: timestamp_column(row, "created_at")?,
            })
        })?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Every log in range, newest first.
pub fn list_entries(db: &Database, range: &TimeRange) -> Result<Vec<EmotionEntry>, DatabaseError> {
    db.with_conn(|conn| {
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();
        let where_sql = where_clause(range, Vec::new(), &mut params);
        let sql = format!(
            "SELECT id, emotion, email_subject, created_at FROM emotion_logs {}
             ORDER BY created_at DESC",
            where_sql
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(param_refs(&params).as_slice(), |row| {
                Ok(EmotionEntry {
                    id: row.get("id")?,
                    emotion: row.get("emotion")?,
                    email_subject: row.get("email_subject")?,
                    created_at: timestamp_column(row, "created_at")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}
