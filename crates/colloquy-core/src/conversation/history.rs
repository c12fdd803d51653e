//! Backend history records and their conversion into conversations.
//!
//! The backend stores one question/answer exchange per record, so each
//! record maps to exactly one conversation holding two messages. Malformed
//! or missing fields degrade to defaults; conversion never fails.

use super::message::{ChatMessage, MessageRole};
use super::model::{Conversation, truncate_title};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder title for a history record whose question is empty.
pub const HISTORY_FALLBACK_TITLE: &str = "History conversation";

/// One question/answer exchange as stored by the backend.
///
/// Read-only input; every field tolerates being absent in the JSON payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryRecord {
    pub id: String,
    pub user_id: String,
    pub session_id: String,
    pub question: String,
    pub answer: String,
    pub create_time: String,
}

impl From<&HistoryRecord> for Conversation {
    /// Converts a history record into a two-message conversation.
    ///
    /// The conversation id prefers the record's `session_id` so that later
    /// questions in the same backend session land in the same conversation;
    /// it falls back to the record id. Message ids are derived from the
    /// record id plus a role suffix and stay stable across repeated
    /// conversions of the same record.
    fn from(record: &HistoryRecord) -> Self {
        let id = if record.session_id.is_empty() {
            record.id.clone()
        } else {
            record.session_id.clone()
        };

        let title = if record.question.is_empty() {
            HISTORY_FALLBACK_TITLE.to_string()
        } else {
            truncate_title(&record.question)
        };

        let timestamp = parse_create_time(&record.create_time);

        let messages = vec![
            ChatMessage {
                id: format!("{}_user", record.id),
                role: MessageRole::User,
                content: record.question.clone(),
                timestamp,
            },
            ChatMessage {
                id: format!("{}_assistant", record.id),
                role: MessageRole::Assistant,
                content: record.answer.clone(),
                timestamp,
            },
        ];

        Self {
            id,
            title,
            messages,
            created_at: timestamp,
            updated_at: timestamp,
            is_history: true,
        }
    }
}

/// Parses the backend's creation timestamp, defaulting to now when the value
/// is absent or unparseable.
///
/// The backend emits ISO 8601 with or without an offset depending on its
/// serializer settings, so both are accepted.
fn parse_create_time(value: &str) -> DateTime<Utc> {
    if value.is_empty() {
        return Utc::now();
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return parsed.with_timezone(&Utc);
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return parsed.and_utc();
        }
    }

    Utc::now()
}
