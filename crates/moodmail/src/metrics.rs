//! Aggregations over stored emotion logs.
//!
//! Predominant emotion per day: for each day the winning emotion is the one with the highest taxonomy
//! priority; equal priorities go to the larger count. Emotions that tie on
//! both keep the order the store grouped them in, which is not a defined
//! ordering.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::db::metrics_repo::{self, DayEmotionCount, Granularity};
use crate::db::{Database, DatabaseError};
use crate::taxonomy::priority_of;
use crate::time_range::{InvalidTimeBound, TimeRange};

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error(transparent)]
    InvalidTimeBound(#[from] InvalidTimeBound),

    #[error("Metrics query failed: {0}")]
    Database(#[from] DatabaseError),
}

/// Per-day emotion count. `created_at` is the day's start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub emotion: String,
    pub created_at: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    /// Bucket start.
    pub period: String,
    pub emotion: String,
    pub count: i64,
}

/// Most recent emotion in range; both fields are null when nothing matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestEmotion {
    pub latest_emotion: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Counts per day and emotion, newest day first.
pub fn daily_summary(db: &Database, range: &TimeRange) -> Result<Vec<DailySummary>, DatabaseError> {
    let rows = metrics_repo::count_by_bucket(db, range, Granularity::Day)?;
    Ok(rows
        .into_iter()
        .map(|row| DailySummary {
            emotion: row.emotion,
            created_at: row.bucket,
            count: row.count,
        })
        .collect())
}

/// Counts per `granularity` bucket and emotion, newest bucket first.
pub fn period_summary(
    db: &Database,
    range: &TimeRange,
    granularity: Granularity,
) -> Result<Vec<PeriodSummary>, DatabaseError> {
    let rows = metrics_repo::count_by_bucket(db, range, granularity)?;
    Ok(rows
        .into_iter()
        .map(|row| PeriodSummary {
            period: row.bucket,
            emotion: row.emotion,
            count: row.count,
        })
        .collect())
}

pub fn latest_emotion(db: &Database, range: &TimeRange) -> Result<LatestEmotion, DatabaseError> {
    let latest = metrics_repo::latest(db, range)?;
    Ok(LatestEmotion {
        latest_emotion: latest.as_ref().map(|l| l.emotion.clone()),
        timestamp: latest.map(|l| l.created_at),
    })
}

/// One emotion's showing on a day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionTally {
    pub emotion: String,
    pub count: i64,
    pub priority: i64,
}

impl EmotionTally {
    pub fn new(emotion: impl Into<String>, count: i64) -> Self {
        let emotion = emotion.into();
        let priority = priority_of(&emotion);
        Self {
            emotion,
            count,
            priority,
        }
    }
}

/// Picks the predominant tally: priority descending, then count descending.
/// The first of several fully tied tallies wins.
pub fn select_predominant(tallies: &[EmotionTally]) -> Option<&EmotionTally> {
    tallies.iter().min_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.count.cmp(&a.count))
    })
}

/// Reported predominant emotion for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredominantEmotion {
    pub emotion: String,
    /// Day formatted `yyyy-MM-dd`.
    pub created_at: String,
    pub email_subject: String,
    /// Priority stored on the example record.
    pub priority: i64,
}

/// Groups per-day counts, preserving day order and in-day order.
fn group_by_day(rows: Vec<DayEmotionCount>) -> Vec<(NaiveDate, Vec<EmotionTally>)> {
    let mut days: Vec<(NaiveDate, Vec<EmotionTally>)> = Vec::new();
    for row in rows {
        let tally = EmotionTally::new(row.emotion, row.count);
        match days.last_mut() {
            Some((day, tallies)) if *day == row.day => tallies.push(tally),
            _ => days.push((row.day, vec![tally])),
        }
    }
    days
}

/// Predominant emotion for every day in range that has logs, oldest first.
pub fn predominant_by_day(
    db: &Database,
    range: &TimeRange,
) -> Result<Vec<PredominantEmotion>, DatabaseError> {
    let rows = metrics_repo::count_by_day(db, range)?;
    let mut results = Vec::new();

    for (day, tallies) in group_by_day(rows) {
        let Some(winner) = select_predominant(&tallies) else {
            continue;
        };

        match metrics_repo::first_on_day(db, day, &winner.emotion, range)? {
            Some(example) => results.push(PredominantEmotion {
                emotion: winner.emotion.clone(),
                created_at: example.created_at.format("%Y-%m-%d").to_string(),
                email_subject: example.email_subject,
                priority: example.priority,
            }),
            None => log::debug!("No example log for {} on {}", winner.emotion, day),
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tallies(items: &[(&str, i64)]) -> Vec<EmotionTally> {
        items
            .iter()
            .map(|(emotion, count)| EmotionTally::new(*emotion, *count))
            .collect()
    }

    #[test]
    fn test_priority_beats_count() {
        let day = tallies(&[("joy", 2), ("trust", 2), ("fear", 5)]);
        assert_eq!(select_predominant(&day).unwrap().emotion, "joy");
    }

    #[test]
    fn test_priority_beats_larger_count() {
        let day = tallies(&[("trust", 3), ("surprise", 7)]);
        assert_eq!(select_predominant(&day).unwrap().emotion, "trust");
    }

    #[test]
    fn test_count_breaks_priority_tie() {
        // `legacy` is not in the taxonomy, so it shares neutral's priority of 1.
        let day = tallies(&[("neutral", 1), ("legacy", 4)]);
        assert_eq!(select_predominant(&day).unwrap().emotion, "legacy");
    }

    #[test]
    fn test_full_tie_keeps_first() {
        let day = tallies(&[("neutral", 2), ("legacy", 2)]);
        assert_eq!(select_predominant(&day).unwrap().emotion, "neutral");
    }

    #[test]
    fn test_empty_has_no_winner() {
        assert!(select_predominant(&[]).is_none());
    }

    #[test]
    fn test_group_by_day_preserves_order() {
        let d1 = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        let rows = vec![
            DayEmotionCount {
                day: d1,
                emotion: "fear".into(),
                count: 3,
            },
            DayEmotionCount {
                day: d1,
                emotion: "joy".into(),
                count: 1,
            },
            DayEmotionCount {
                day: d2,
                emotion: "anger".into(),
                count: 1,
            },
        ];

        let grouped = group_by_day(rows);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, d1);
        assert_eq!(grouped[0].1.len(), 2);
        assert_eq!(grouped[0].1[1].priority, 10);
        assert_eq!(grouped[1].0, d2);
    }
}
