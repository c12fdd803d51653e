//! Chat message types.

use crate::ident;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents the author of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// A single message in a conversation.
///
/// Content is immutable once created; a message is never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message identifier within its conversation.
    pub id: String,
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// Timestamp when the message was created.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Creates a message with a fresh identifier and the current time.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: ident::message_id(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}
