//! Stored emotion log queries.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use moodmail::db::{emotion_log_repo, EmotionLogRow, Page, PageRequest};
use serde::Deserialize;

use super::ApiError;
use crate::state::AppState;

/// Raw paging parameters; invalid values fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<EmotionLogRow>>, ApiError> {
    let request = PageRequest::parse(query.page.as_deref(), query.limit.as_deref());

    state
        .db
        .run(move |db| emotion_log_repo::list_page(db, request))
        .await
        .map(Json)
        .map_err(|e| ApiError::internal("Could not fetch logs", e))
}

pub async fn get_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EmotionLogRow>, ApiError> {
    let found = state
        .db
        .run(move |db| emotion_log_repo::find_by_id(db, &id))
        .await
        .map_err(|e| ApiError::internal("Error fetching log", e))?;

    found
        .map(Json)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "Not found"))
}

/// Deletes a log. An unknown id is reported as a failed delete.
pub async fn delete_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .db
        .run(move |db| emotion_log_repo::delete(db, &id))
        .await
        .map_err(|e| ApiError::internal("Could not delete log", e))?;

    Ok(StatusCode::NO_CONTENT)
}
