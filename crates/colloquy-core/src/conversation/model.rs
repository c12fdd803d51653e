//! Conversation domain model.
//!
//! This module contains the core Conversation entity that the store and the
//! application services operate on.

use super::message::ChatMessage;
use crate::ident;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder title for a conversation that has not produced one yet.
pub const DEFAULT_TITLE: &str = "New conversation";

/// Maximum number of characters a derived title keeps from the message.
pub const TITLE_MAX_CHARS: usize = 30;

/// Marker appended to a derived title when the source text was truncated.
pub const TITLE_TRUNCATION_MARKER: &str = "...";

/// A titled, ordered sequence of messages plus lifecycle timestamps.
///
/// A conversation is created either by the user's "new chat" action or by
/// converting a backend history record. `updated_at` advances on any
/// mutation (message appended, rename, merge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier, stable for the conversation's lifetime.
    pub id: String,
    /// Human-readable title; derived from the first user message unless
    /// explicitly renamed.
    pub title: String,
    /// Ordered message list, append-only from the store's perspective.
    pub messages: Vec<ChatMessage>,
    /// Timestamp when the conversation was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
    /// True when this conversation originated from backend history rather
    /// than the current session.
    #[serde(default)]
    pub is_history: bool,
}

impl Conversation {
    /// Creates an empty, locally originated conversation with a fresh id.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: ident::conversation_id(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            is_history: false,
        }
    }

    /// True while the title is still the placeholder and may be replaced by
    /// one derived from the first message.
    pub fn has_derivable_title(&self) -> bool {
        self.title == DEFAULT_TITLE
    }

    /// Marks the conversation as mutated.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives a conversation title from message text.
///
/// Keeps the first [`TITLE_MAX_CHARS`] characters and appends the truncation
/// marker when the text is longer. Empty text falls back to the placeholder.
pub fn derive_title(content: &str) -> String {
    if content.is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    truncate_title(content)
}

pub(crate) fn truncate_title(content: &str) -> String {
    if content.chars().count() > TITLE_MAX_CHARS {
        let head: String = content.chars().take(TITLE_MAX_CHARS).collect();
        format!("{head}{TITLE_TRUNCATION_MARKER}")
    } else {
        content.to_string()
    }
}
