//! Chat orchestration service.
//!
//! `ChatService` coordinates the conversation store, the session binder and
//! the backend gateway: loading and reconciling history, the send flow with
//! its failure-to-transcript policy, and conversation lifecycle actions.

use colloquy_core::conversation::{ChatMessage, Conversation, ConversationStore, MessageRole};
use colloquy_core::gateway::QaBackend;
use colloquy_core::session::SessionBinder;
use colloquy_core::user::Credentials;
use colloquy_core::{ChatError, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Fixed local reply when a message is sent without an authenticated user.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in before using the chat assistant.";

/// Builds the transcript message shown when a send fails.
fn send_failure_message(err: &ChatError) -> String {
    format!("Sorry, something went wrong while sending your message: {err}")
}

/// Result of a send: the targeted conversation and the assistant-role reply
/// (the answer, a failure notice, or the log-in notice).
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub conversation_id: Option<String>,
    pub reply: ChatMessage,
}

/// Application service tying the store, binder and backend together.
///
/// Store mutations happen under a single writer lock and never span the
/// network await, so a second send can be issued while one is outstanding;
/// each completion is applied independently in completion order.
pub struct ChatService {
    store: RwLock<ConversationStore>,
    binder: RwLock<SessionBinder>,
    backend: Arc<dyn QaBackend>,
    credentials: Option<Credentials>,
}

impl ChatService {
    /// Creates a service over a backend gateway and an optional logged-in
    /// user.
    pub fn new(backend: Arc<dyn QaBackend>, credentials: Option<Credentials>) -> Self {
        Self {
            store: RwLock::new(ConversationStore::new()),
            binder: RwLock::new(SessionBinder::new()),
            backend,
            credentials,
        }
    }

    /// Fetches the user's history and reconciles it into the store.
    ///
    /// Returns the number of fetched records. Without an authenticated user
    /// there is nothing to fetch and the store is left alone. A missing
    /// history (404) has already been absorbed by the gateway; other
    /// failures propagate to the caller.
    pub async fn load_history(&self) -> Result<usize> {
        let Some(credentials) = &self.credentials else {
            tracing::debug!("no authenticated user, skipping history load");
            return Ok(0);
        };

        let records = self.backend.fetch_history(credentials.user_id).await?;
        let mut store = self.store.write().await;
        store.reconcile_with_history(&records);
        tracing::debug!(count = records.len(), "history reconciled");
        Ok(records.len())
    }

    /// Sends a message in the active conversation.
    ///
    /// Without an authenticated user the send short-circuits before any
    /// network call and the fixed log-in notice becomes the reply. Otherwise
    /// the flow is: ensure an active conversation (one is created when
    /// sending from the empty state), derive the title from the first
    /// message, append the user message, resolve the session id, ask the
    /// backend, and record the answer - or a failure notice - as an
    /// assistant message. A reply whose conversation was deleted while the
    /// request was in flight is discarded.
    pub async fn send_message(&self, content: &str) -> Result<SendOutcome> {
        let Some(credentials) = &self.credentials else {
            let mut store = self.store.write().await;
            let conversation_id = store.active_conversation_id().map(str::to_owned);
            let reply = store
                .append_message(
                    conversation_id.as_deref(),
                    MessageRole::Assistant,
                    LOGIN_REQUIRED_MESSAGE,
                )
                .unwrap_or_else(|| ChatMessage::new(MessageRole::Assistant, LOGIN_REQUIRED_MESSAGE));
            return Ok(SendOutcome {
                conversation_id,
                reply,
            });
        };

        let (conversation_id, session_id) = {
            let mut store = self.store.write().await;
            let conversation_id = match store.active_conversation_id().map(str::to_owned) {
                Some(id) => id,
                None => store.create_conversation(),
            };
            store.set_title_from_first_message(Some(&conversation_id), content);
            store.append_message(Some(&conversation_id), MessageRole::User, content);

            let session_id = self.binder.write().await.resolve(Some(&conversation_id));
            (conversation_id, session_id)
        };

        tracing::debug!(%conversation_id, %session_id, "dispatching question");
        let reply_text = match self
            .backend
            .ask(credentials.user_id, content, &session_id)
            .await
        {
            Ok(answer) => answer,
            Err(err) => {
                tracing::warn!(%err, %conversation_id, "question failed");
                send_failure_message(&err)
            }
        };

        let reply = self
            .record_reply(&conversation_id, &reply_text)
            .await
            .unwrap_or_else(|| ChatMessage::new(MessageRole::Assistant, reply_text.clone()));

        Ok(SendOutcome {
            conversation_id: Some(conversation_id),
            reply,
        })
    }

    /// Creates a new empty conversation and makes it active.
    pub async fn new_conversation(&self) -> String {
        self.store.write().await.create_conversation()
    }

    /// Moves the active pointer.
    pub async fn select_conversation(&self, id: &str) {
        self.store.write().await.select_conversation(id);
    }

    /// Renames a conversation locally.
    pub async fn rename_conversation(&self, id: &str, title: &str) {
        self.store.write().await.rename_conversation(id, title);
    }

    /// Deletes a conversation.
    ///
    /// History-sourced conversations are removed on the backend first; when
    /// that fails the local copy stays and the error propagates. Purely
    /// local conversations are only removed locally.
    pub async fn delete_conversation(&self, id: &str) -> Result<()> {
        let is_history = {
            let store = self.store.read().await;
            match store.get(id) {
                Some(conversation) => conversation.is_history,
                None => return Ok(()),
            }
        };

        if is_history {
            self.backend.delete_history(id).await?;
        }

        self.store.write().await.delete_conversation(id);
        Ok(())
    }

    /// Snapshot of the conversations in display order.
    pub async fn conversations(&self) -> Vec<Conversation> {
        self.store.read().await.conversations().to_vec()
    }

    /// Snapshot of the active conversation.
    pub async fn active_conversation(&self) -> Option<Conversation> {
        self.store.read().await.active_conversation().cloned()
    }

    /// Id held by the active pointer.
    pub async fn active_conversation_id(&self) -> Option<String> {
        self.store
            .read()
            .await
            .active_conversation_id()
            .map(str::to_owned)
    }

    /// The logged-in user, if any.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    // Applies a completed reply, unless its conversation was deleted while
    // the request was in flight.
    async fn record_reply(&self, conversation_id: &str, content: &str) -> Option<ChatMessage> {
        let mut store = self.store.write().await;
        if store.get(conversation_id).is_none() {
            tracing::debug!(conversation_id, "conversation gone, discarding late reply");
            return None;
        }
        store.append_message(Some(conversation_id), MessageRole::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use colloquy_core::conversation::HistoryRecord;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockBackend {
        history: Vec<HistoryRecord>,
        answers: Mutex<VecDeque<Result<String>>>,
        asks: Mutex<Vec<(i64, String, String)>>,
        deletes: Mutex<Vec<String>>,
        delete_error: Option<ChatError>,
    }

    impl MockBackend {
        fn with_answers(answers: Vec<Result<String>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                ..Self::default()
            }
        }

        fn asked(&self) -> Vec<(i64, String, String)> {
            self.asks.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QaBackend for MockBackend {
        async fn fetch_history(&self, _user_id: i64) -> Result<Vec<HistoryRecord>> {
            Ok(self.history.clone())
        }

        async fn delete_history(&self, conversation_id: &str) -> Result<()> {
            if let Some(err) = &self.delete_error {
                return Err(err.clone());
            }
            self.deletes.lock().unwrap().push(conversation_id.to_string());
            Ok(())
        }

        async fn ask(&self, user_id: i64, question: &str, session_id: &str) -> Result<String> {
            self.asks.lock().unwrap().push((
                user_id,
                question.to_string(),
                session_id.to_string(),
            ));
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("mock answer".to_string()))
        }
    }

    fn history_record(id: &str, session_id: &str, question: &str) -> HistoryRecord {
        HistoryRecord {
            id: id.to_string(),
            user_id: "42".to_string(),
            session_id: session_id.to_string(),
            question: question.to_string(),
            answer: "stored answer".to_string(),
            create_time: "2024-03-01T10:30:00".to_string(),
        }
    }

    fn service(backend: Arc<MockBackend>) -> ChatService {
        ChatService::new(backend, Some(Credentials::new(42).with_token("jwt")))
    }

    #[tokio::test]
    async fn send_creates_conversation_and_records_exchange() {
        let backend = Arc::new(MockBackend::default());
        let service = service(backend.clone());

        let outcome = service.send_message("How do lifetimes work?").await.unwrap();

        let conversation = service.active_conversation().await.unwrap();
        assert_eq!(outcome.conversation_id.as_deref(), Some(conversation.id.as_str()));
        assert_eq!(conversation.title, "How do lifetimes work?");
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[0].role, MessageRole::User);
        assert_eq!(conversation.messages[1].role, MessageRole::Assistant);
        assert_eq!(conversation.messages[1].content, "mock answer");
        assert_eq!(outcome.reply.content, "mock answer");
    }

    #[tokio::test]
    async fn sequential_sends_reuse_the_session_id() {
        let backend = Arc::new(MockBackend::default());
        let service = service(backend.clone());

        service.send_message("first").await.unwrap();
        service.send_message("second").await.unwrap();

        let asks = backend.asked();
        assert_eq!(asks.len(), 2);
        assert_eq!(asks[0].0, 42);
        assert_eq!(asks[0].2, asks[1].2);

        // The binder adopted the conversation id as the session id.
        let conversation_id = service.active_conversation_id().await.unwrap();
        assert_eq!(asks[0].2, conversation_id);
    }

    #[tokio::test]
    async fn switching_conversations_rebinds_the_session() {
        let backend = Arc::new(MockBackend::default());
        let service = service(backend.clone());

        service.send_message("in the first").await.unwrap();
        let first = service.active_conversation_id().await.unwrap();

        service.new_conversation().await;
        service.send_message("in the second").await.unwrap();

        let asks = backend.asked();
        assert_eq!(asks[0].2, first);
        assert_ne!(asks[1].2, first);
    }

    #[tokio::test]
    async fn failed_send_becomes_a_transcript_message() {
        let backend = Arc::new(MockBackend::with_answers(vec![Err(ChatError::http(
            500,
            "Internal Server Error",
            "boom",
        ))]));
        let service = service(backend);

        let outcome = service.send_message("hello?").await.unwrap();

        assert!(outcome.reply.content.contains("HTTP 500"));
        let conversation = service.active_conversation().await.unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[1].role, MessageRole::Assistant);
        assert!(conversation.messages[1].content.contains("boom"));
    }

    #[tokio::test]
    async fn unauthenticated_send_short_circuits() {
        let backend = Arc::new(MockBackend::default());
        let service = ChatService::new(backend.clone(), None);

        let outcome = service.send_message("hello").await.unwrap();

        assert!(backend.asked().is_empty());
        assert_eq!(outcome.reply.content, LOGIN_REQUIRED_MESSAGE);
        assert!(outcome.conversation_id.is_none());
        assert!(service.conversations().await.is_empty());
    }

    #[tokio::test]
    async fn unauthenticated_send_lands_in_active_conversation() {
        let backend = Arc::new(MockBackend::default());
        let service = ChatService::new(backend, None);

        let id = service.new_conversation().await;
        let outcome = service.send_message("hello").await.unwrap();

        assert_eq!(outcome.conversation_id.as_deref(), Some(id.as_str()));
        let conversation = service.active_conversation().await.unwrap();
        assert_eq!(conversation.messages.len(), 1);
        assert_eq!(conversation.messages[0].content, LOGIN_REQUIRED_MESSAGE);
    }

    #[tokio::test]
    async fn late_reply_for_deleted_conversation_is_discarded() {
        let backend = Arc::new(MockBackend::default());
        let service = service(backend);

        let id = service.new_conversation().await;
        service.delete_conversation(&id).await.unwrap();

        let recorded = service.record_reply(&id, "late answer").await;
        assert!(recorded.is_none());
        assert!(service.conversations().await.is_empty());
    }

    #[tokio::test]
    async fn load_history_merges_server_and_local() {
        let backend = Arc::new(MockBackend {
            history: vec![
                history_record("1", "s-1", "stored one"),
                history_record("2", "s-2", "stored two"),
            ],
            ..MockBackend::default()
        });
        let service = service(backend);

        let local = service.new_conversation().await;
        let count = service.load_history().await.unwrap();

        assert_eq!(count, 2);
        let conversations = service.conversations().await;
        assert_eq!(conversations.len(), 3);
        assert!(conversations.iter().any(|c| c.id == local));
        assert_eq!(service.active_conversation_id().await, Some(local));
    }

    #[tokio::test]
    async fn unauthenticated_history_load_is_a_no_op() {
        let backend = Arc::new(MockBackend {
            history: vec![history_record("1", "s-1", "stored")],
            ..MockBackend::default()
        });
        let service = ChatService::new(backend, None);

        assert_eq!(service.load_history().await.unwrap(), 0);
        assert!(service.conversations().await.is_empty());
    }

    #[tokio::test]
    async fn deleting_history_conversation_hits_the_backend() {
        let backend = Arc::new(MockBackend {
            history: vec![history_record("1", "s-1", "stored")],
            ..MockBackend::default()
        });
        let service = service(backend.clone());
        service.load_history().await.unwrap();

        service.delete_conversation("s-1").await.unwrap();

        assert_eq!(*backend.deletes.lock().unwrap(), vec!["s-1".to_string()]);
        assert!(service.conversations().await.is_empty());
    }

    #[tokio::test]
    async fn deleting_local_conversation_skips_the_backend() {
        let backend = Arc::new(MockBackend::default());
        let service = service(backend.clone());

        let id = service.new_conversation().await;
        service.delete_conversation(&id).await.unwrap();

        assert!(backend.deletes.lock().unwrap().is_empty());
        assert!(service.conversations().await.is_empty());
    }

    #[tokio::test]
    async fn failed_remote_delete_keeps_local_copy() {
        let backend = Arc::new(MockBackend {
            history: vec![history_record("1", "s-1", "stored")],
            delete_error: Some(ChatError::http(500, "Internal Server Error", "nope")),
            ..MockBackend::default()
        });
        let service = service(backend);
        service.load_history().await.unwrap();

        let err = service.delete_conversation("s-1").await.unwrap_err();
        assert!(err.is_http());
        assert_eq!(service.conversations().await.len(), 1);
    }

    #[tokio::test]
    async fn title_follows_only_the_first_message() {
        let backend = Arc::new(MockBackend::default());
        let service = service(backend);

        service.send_message("the opening question").await.unwrap();
        service.send_message("a follow-up").await.unwrap();

        let conversation = service.active_conversation().await.unwrap();
        assert_eq!(conversation.title, "the opening question");
        assert_eq!(conversation.messages.len(), 4);
    }
}
