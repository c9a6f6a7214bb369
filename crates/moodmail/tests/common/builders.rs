//! Builder patterns for creating test data programmatically.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use moodmail::db::{emotion_log_repo, Database, EmotionLogRow, NewEmotionLog};
use moodmail::{Emotion, InboundEmail};
use serde_json::{json, Value};

/// Builder for inbound webhook payloads.
pub struct InboundEmailBuilder {
    payload: Value,
}

impl InboundEmailBuilder {
    pub fn new(subject: &str, body: &str) -> Self {
        Self {
            payload: json!({ "Subject": subject, "TextBody": body }),
        }
    }

    pub fn from(mut self, name: &str, email: &str) -> Self {
        self.payload["FromName"] = json!(name);
        self.payload["FromFull"] = json!({ "Email": email, "Name": name });
        self
    }

    pub fn to(mut self, to: &str) -> Self {
        self.payload["To"] = json!(to);
        self
    }

    pub fn message_id(mut self, id: &str) -> Self {
        self.payload["MessageID"] = json!(id);
        self
    }

    pub fn date(mut self, date: &str) -> Self {
        self.payload["Date"] = json!(date);
        self
    }

    pub fn attachments(mut self, attachments: Value) -> Self {
        self.payload["Attachments"] = attachments;
        self
    }

    pub fn build(self) -> InboundEmail {
        serde_json::from_value(self.payload).expect("Invalid inbound payload")
    }
}

/// Builder for logs stored directly at a chosen creation time.
pub struct LogBuilder {
    log: NewEmotionLog,
}

impl LogBuilder {
    pub fn new(emotion: Emotion) -> Self {
        Self {
            log: NewEmotionLog {
                email_subject: format!("{} email", emotion),
                email_body: "body".to_string(),
                emotion,
                original_emotion: Some(emotion.as_str().to_string()),
                from_name: None,
                from_email: None,
                to_email: None,
                message_id: None,
                date: None,
                analysis: None,
                attachment: None,
            },
        }
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.log.email_subject = subject.to_string();
        self
    }

    pub fn insert_at(self, db: &Database, created_at: DateTime<Utc>) -> EmotionLogRow {
        emotion_log_repo::insert_at(db, &self.log, created_at).expect("Failed to insert log")
    }
}

/// UTC timestamp in January 2026.
pub fn jan(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, day, hour, minute, 0).unwrap()
}
