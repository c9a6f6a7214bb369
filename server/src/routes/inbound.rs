//! Inbound email webhook.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use moodmail::db::EmotionLogRow;
use moodmail::InboundEmail;

use super::ApiError;
use crate::state::AppState;

const INGEST_FAILED: &str = "Failed to process email.";

/// Classifies and stores one inbound email.
pub async fn receive_email(
    State(state): State<AppState>,
    payload: Result<Json<InboundEmail>, JsonRejection>,
) -> Result<(StatusCode, Json<EmotionLogRow>), ApiError> {
    let Json(email) = payload.map_err(|e| ApiError::internal(INGEST_FAILED, e))?;

    let saved = moodmail::ingest(&state.db, state.classifier.as_ref(), email)
        .await
        .map_err(|e| ApiError::internal(INGEST_FAILED, e))?;

    Ok((StatusCode::CREATED, Json(saved)))
}
