//! Emotion log repository: create, read and delete for the `emotion_logs` table.

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Row};
use serde::Serialize;
use serde_json::Value;

use super::{format_timestamp, Database, DatabaseError};
use crate::taxonomy::Emotion;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// A stored, classified email.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionLogRow {
    pub id: String,
    pub email_subject: String,
    pub email_body: String,
    /// Coarse category name.
    pub emotion: String,
    /// Label as returned by the classifier.
    pub original_emotion: Option<String>,
    pub from_name: Option<String>,
    pub from_email: Option<String>,
    pub to_email: Option<String>,
    pub message_id: Option<String>,
    /// Message date as sent by the mail provider.
    pub date: Option<DateTime<Utc>>,
    /// Raw classifier output.
    pub analysis: Option<Value>,
    pub attachment: Option<Value>,
    pub priority: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmotionLogRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            email_subject: row.get("email_subject")?,
            email_body: row.get("email_body")?,
            emotion: row.get("emotion")?,
            original_emotion: row.get("original_emotion")?,
            from_name: row.get("from_name")?,
            from_email: row.get("from_email")?,
            to_email: row.get("to_email")?,
            message_id: row.get("message_id")?,
            date: optional_timestamp_column(row, "date")?,
            analysis: json_column(row, "analysis")?,
            attachment: json_column(row, "attachment")?,
            priority: row.get("priority")?,
            created_at: timestamp_column(row, "created_at")?,
            updated_at: timestamp_column(row, "updated_at")?,
        })
    }
}

pub(crate) fn timestamp_column(row: &Row<'_>, name: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    let raw: String = row.get(name)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            let idx = row.as_ref().column_index(name).unwrap_or(0);
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
        })
}

fn optional_timestamp_column(
    row: &Row<'_>,
    name: &str,
) -> Result<Option<DateTime<Utc>>, rusqlite::Error> {
    let raw: Option<String> = row.get(name)?;
    match raw {
        None => Ok(None),
        Some(_) => timestamp_column(row, name).map(Some),
    }
}

fn json_column(row: &Row<'_>, name: &str) -> Result<Option<Value>, rusqlite::Error> {
    let raw: Option<String> = row.get(name)?;
    raw.map(|text| {
        serde_json::from_str(&text).map_err(|e| {
            let idx = row.as_ref().column_index(name).unwrap_or(0);
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
        })
    })
    .transpose()
}

/// Fields supplied by ingestion. Identifier, priority and timestamps are
/// assigned on insert.
#[derive(Debug, Clone)]
pub struct NewEmotionLog {
    pub email_subject: String,
    pub email_body: String,
    pub emotion: Emotion,
    pub original_emotion: Option<String>,
    pub from_name: Option<String>,
    pub from_email: Option<String>,
    pub to_email: Option<String>,
    pub message_id: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub analysis: Option<Value>,
    pub attachment: Option<Value>,
}

/// Inserts a new log stamped with the current time.
pub fn insert(db: &Database, log: &NewEmotionLog) -> Result<EmotionLogRow, DatabaseError> {
    insert_at(db, log, Utc::now())
}

/// Inserts a new log with an explicit creation time.
///
/// Priority is derived from the emotion here and never recomputed.
/// Timestamps keep millisecond precision, matching the stored format.
pub fn insert_at(
    db: &Database,
    log: &NewEmotionLog,
    created_at: DateTime<Utc>,
) -> Result<EmotionLogRow, DatabaseError> {
    let created_at = created_at.trunc_subsecs(3);
    let row = EmotionLogRow {
        id: uuid::Uuid::new_v4().to_string(),
        email_subject: log.email_subject.clone(),
        email_body: log.email_body.clone(),
        emotion: log.emotion.as_str().to_string(),
        original_emotion: log.original_emotion.clone(),
        from_name: log.from_name.clone(),
        from_email: log.from_email.clone(),
        to_email: log.to_email.clone(),
        message_id: log.message_id.clone(),
        date: log.date.map(|d| d.trunc_subsecs(3)),
        analysis: log.analysis.clone(),
        attachment: log.attachment.clone(),
        priority: log.emotion.priority(),
        created_at,
        updated_at: created_at,
    };

    let analysis = row.analysis.as_ref().map(serde_json::to_string).transpose()?;
    let attachment = row
        .attachment
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO emotion_logs (id, email_subject, email_body, emotion, original_emotion,
             from_name, from_email, to_email, message_id, date, analysis, attachment, priority,
             created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                row.id,
                row.email_subject,
                row.email_body,
                row.emotion,
                row.original_emotion,
                row.from_name,
                row.from_email,
                row.to_email,
                row.message_id,
                row.date.map(format_timestamp),
                analysis,
                attachment,
                row.priority,
                format_timestamp(row.created_at),
                format_timestamp(row.updated_at),
            ],
        )?;
        Ok(())
    })?;

    Ok(row)
}

/// Finds a log by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<EmotionLogRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM emotion_logs WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], EmotionLogRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Deletes a log. A missing ID is an error, not a silent success.
pub fn delete(db: &Database, id: &str) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        let affected = conn.execute("DELETE FROM emotion_logs WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(DatabaseError::NotFound(id.to_string()));
        }
        Ok(())
    })
}

/// Counts all stored logs.
pub fn count(db: &Database) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let total: u64 = conn.query_row("SELECT COUNT(*) FROM emotion_logs", [], |r| r.get(0))?;
        Ok(total)
    })
}

/// Requested page, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Builds a request from raw query values. Missing, non-numeric or
    /// non-positive values fall back to the defaults.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Self {
        fn positive(raw: Option<&str>) -> Option<u64> {
            raw.and_then(|s| s.trim().parse::<i64>().ok())
                .filter(|n| *n > 0)
                .map(|n| n as u64)
        }

        Self {
            page: positive(page).unwrap_or(DEFAULT_PAGE),
            limit: positive(limit).unwrap_or(DEFAULT_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Pagination metadata returned next to a page of logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub total_records: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(request: PageRequest, total_records: u64) -> Self {
        let total_pages = total_records.div_ceil(request.limit);
        Self {
            current_page: request.page,
            limit: request.limit,
            total_pages,
            total_records,
            has_next_page: request.page < total_pages,
            has_prev_page: request.page > 1,
        }
    }
}

/// One page of logs.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Lists logs newest first.
pub fn list_page(db: &Database, request: PageRequest) -> Result<Page<EmotionLogRow>, DatabaseError> {
    let total = count(db)?;
    let limit = i64::try_from(request.limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);

    let data = db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM emotion_logs ORDER BY created_at DESC, id LIMIT ?1 OFFSET ?2",
        )?;
        let rows = stmt
            .query_map(params![limit, offset], EmotionLogRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;

    Ok(Page {
        data,
        pagination: Pagination::new(request, total),
    })
}
