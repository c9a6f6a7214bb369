//! Inbound email ingestion: classify, map to a coarse emotion, persist.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};

use crate::classifier::{ClassifierError, EmotionClassifier};
use crate::db::{emotion_log_repo, Database, DatabaseError, EmotionLogRow, NewEmotionLog};
use crate::taxonomy::map_label;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Classification failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Failed to store emotion log: {0}")]
    Database(#[from] DatabaseError),
}

/// Sender address block of an inbound webhook payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundAddress {
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
}

/// Inbound email webhook payload. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundEmail {
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "TextBody")]
    pub text_body: String,
    #[serde(rename = "FromName", default)]
    pub from_name: Option<String>,
    #[serde(rename = "FromFull", default)]
    pub from_full: Option<InboundAddress>,
    #[serde(rename = "To", default)]
    pub to: Option<String>,
    #[serde(rename = "MessageID", default)]
    pub message_id: Option<String>,
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Attachments", default)]
    pub attachments: Option<Value>,
}

/// Parses a message `Date` header. Accepts RFC 2822 and RFC 3339.
pub fn parse_message_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Classifies `email` and stores the result. Returns the stored record.
pub async fn ingest(
    db: &Database,
    classifier: &dyn EmotionClassifier,
    email: InboundEmail,
) -> Result<EmotionLogRow, IngestError> {
    let span = info_span!(
        "ingest.email",
        message_id = email.message_id.as_deref().unwrap_or(""),
        body_len = email.text_body.len()
    );

    async move {
        let classification = classifier.classify(&email.text_body).await?;
        let original = classification.top_label().to_string();
        let emotion = map_label(&original);

        let date = email.date.as_deref().and_then(|raw| {
            let parsed = parse_message_date(raw);
            if parsed.is_none() {
                warn!(date = raw, "Unparseable message date, storing null");
            }
            parsed
        });

        let log = NewEmotionLog {
            email_subject: email.subject,
            email_body: email.text_body,
            emotion,
            original_emotion: Some(original),
            from_name: email.from_name,
            from_email: email.from_full.and_then(|f| f.email),
            to_email: email.to,
            message_id: email.message_id,
            date,
            analysis: Some(classification.raw),
            attachment: email.attachments,
        };

        let saved = db.run(move |db| emotion_log_repo::insert(db, &log)).await?;

        info!(
            id = %saved.id,
            emotion = %saved.emotion,
            original = saved.original_emotion.as_deref().unwrap_or(""),
            priority = saved.priority,
            "Stored emotion log"
        );
        Ok(saved)
    }
    .instrument(span)
    .await
}
