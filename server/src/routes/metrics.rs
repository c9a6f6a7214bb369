//! Aggregation endpoints. Every one accepts optional inclusive `startTime`
//! and `endTime` bounds on creation time.

use axum::extract::{Query, State};
use axum::Json;
use moodmail::db::metrics_repo::{self, EmotionCount, EmotionEntry, Granularity};
use moodmail::db::{Database, DatabaseError};
use moodmail::metrics::{
    self as aggregate, DailySummary, LatestEmotion, MetricsError, PeriodSummary,
    PredominantEmotion,
};
use moodmail::TimeRange;
use serde::Deserialize;

use super::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub mode: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl RangeQuery {
    fn range(&self) -> Result<TimeRange, MetricsError> {
        Ok(TimeRange::parse(
            self.start_time.as_deref(),
            self.end_time.as_deref(),
        )?)
    }
}

/// Parses the range and runs `query` on the blocking pool.
async fn run_in_range<F, T>(
    state: &AppState,
    query: &RangeQuery,
    f: F,
) -> Result<T, MetricsError>
where
    F: FnOnce(&Database, &TimeRange) -> Result<T, DatabaseError> + Send + 'static,
    T: Send + 'static,
{
    let range = query.range()?;
    Ok(state.db.run(move |db| f(db, &range)).await?)
}

pub async fn emotion_count(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<EmotionCount>>, ApiError> {
    run_in_range(&state, &query, metrics_repo::count_by_emotion)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Metrics failed", e))
}

pub async fn daily_summary(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<DailySummary>>, ApiError> {
    run_in_range(&state, &query, aggregate::daily_summary)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Failed to load summary", e))
}

/// Counts per `mode` bucket (`day`, `week` or `month`).
pub async fn emotion_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<Vec<PeriodSummary>>, ApiError> {
    let granularity = Granularity::from_mode(query.mode.as_deref());
    let range_query = RangeQuery {
        start_time: query.start_time,
        end_time: query.end_time,
    };

    run_in_range(&state, &range_query, move |db, range| {
        aggregate::period_summary(db, range, granularity)
    })
    .await
    .map(Json)
    .map_err(|e| ApiError::internal("Failed to generate summary", e))
}

pub async fn latest_emotion(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<LatestEmotion>, ApiError> {
    run_in_range(&state, &query, aggregate::latest_emotion)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Failed to get latest emotion", e))
}

pub async fn predominant_emotion(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<PredominantEmotion>>, ApiError> {
    run_in_range(&state, &query, aggregate::predominant_by_day)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Failed to get predominant emotions by date", e))
}

pub async fn all_emotions(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<EmotionEntry>>, ApiError> {
    run_in_range(&state, &query, metrics_repo::list_entries)
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Failed to get all emotions", e))
}
