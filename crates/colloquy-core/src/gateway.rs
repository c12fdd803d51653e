//! Backend gateway trait.
//!
//! Defines the interface to the remote question-answering service, decoupling
//! the application's core logic from the HTTP transport.

use crate::conversation::HistoryRecord;
use crate::error::Result;
use async_trait::async_trait;

/// An abstract gateway to the question-answering backend.
///
/// Implementations are expected to:
/// - absorb a 404 on the history fetch (no history yet is not an error),
/// - surface every other non-2xx response as [`crate::ChatError::Http`]
///   with the body text included,
/// - report transport failures as [`crate::ChatError::Network`].
#[async_trait]
pub trait QaBackend: Send + Sync {
    /// Fetches the stored question/answer history for a user.
    ///
    /// # Returns
    ///
    /// - `Ok(records)`: history found (possibly empty)
    /// - `Err(_)`: transport failure or non-2xx other than 404
    async fn fetch_history(&self, user_id: i64) -> Result<Vec<HistoryRecord>>;

    /// Deletes one stored conversation from the backend.
    async fn delete_history(&self, conversation_id: &str) -> Result<()>;

    /// Submits a question and returns the assistant's answer.
    ///
    /// The answer is the raw response body text, not a JSON envelope.
    async fn ask(&self, user_id: i64, question: &str, session_id: &str) -> Result<String>;
}
