//! Conversation domain module.
//!
//! This module contains the conversation-related domain models and the
//! in-memory store that owns them.
//!
//! # Module Structure
//!
//! - `model`: Core conversation domain model (`Conversation`)
//! - `message`: Message types (`MessageRole`, `ChatMessage`)
//! - `history`: Backend history records and conversion (`HistoryRecord`)
//! - `store`: Collection, reconciliation and active pointer
//!   (`ConversationStore`)

mod history;
mod message;
mod model;
mod store;

// Re-export public API
pub use history::{HISTORY_FALLBACK_TITLE, HistoryRecord};
pub use message::{ChatMessage, MessageRole};
pub use model::{Conversation, DEFAULT_TITLE, TITLE_MAX_CHARS, derive_title};
pub use store::ConversationStore;
