//! HTTP routes for the moodmail server.
//!
//! Routes are organized by domain:
//! - `inbound`: inbound email webhook
//! - `emotion_logs`: listing, fetching and deleting stored logs
//! - `metrics`: aggregations over stored logs

pub mod emotion_logs;
pub mod inbound;
pub mod metrics;

use std::fmt::Display;

use axum::extract::OriginalUri;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Error response with a fixed, client-safe message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    /// Logs `cause` and returns a 500 carrying only `message`.
    pub fn internal(message: &'static str, cause: impl Display) -> Self {
        tracing::error!(error = %cause, "{}", message);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/inbound-email", post(inbound::receive_email))
        .route("/emotion-logs", get(emotion_logs::list_logs))
        .route(
            "/emotion-logs/:id",
            get(emotion_logs::get_log).delete(emotion_logs::delete_log),
        )
        .route("/metrics/emotion-count", get(metrics::emotion_count))
        .route("/metrics/daily-summary", get(metrics::daily_summary))
        .route("/metrics/emotion-summary", get(metrics::emotion_summary))
        .route("/metrics/latest-emotion", get(metrics::latest_emotion))
        .route("/metrics/predominant-emotion", get(metrics::predominant_emotion))
        .route("/metrics/all-emotions", get(metrics::all_emotions));

    Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn not_found(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status": "fail",
            "message": format!("Can't find {} on this server!", uri),
        })),
    )
}
