//! In-memory conversation collection and reconciliation.

use super::history::HistoryRecord;
use super::message::{ChatMessage, MessageRole};
use super::model::{Conversation, derive_title};
use crate::ident;
use std::collections::HashSet;

/// Ordered collection of conversations plus the active-conversation pointer.
///
/// The vector order is the display order; it is re-sorted descending by
/// `updated_at` after every mutation, with ties keeping their previous
/// relative order. All mutations are synchronous and preserve the invariant
/// that no two conversations share an id.
///
/// The active pointer is a weak reference: it is not required to name an
/// existing conversation, lookups through it simply return `None` then.
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active_id: Option<String>,
}

impl ConversationStore {
    /// Creates an empty store with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges backend history records into the collection.
    ///
    /// The merge is seeded with the converted server records first; local
    /// conversations whose id is not already taken are kept afterwards.
    /// Server data therefore wins id ties (stale local copies of persisted
    /// conversations are replaced) while purely-local conversations, such as
    /// an unsent new chat, survive. The active pointer is not touched.
    pub fn reconcile_with_history(&mut self, records: &[HistoryRecord]) {
        let mut seen: HashSet<String> = HashSet::new();
        let mut merged: Vec<Conversation> = Vec::with_capacity(self.conversations.len() + records.len());

        for record in records {
            let conversation = Conversation::from(record);
            if seen.insert(conversation.id.clone()) {
                merged.push(conversation);
            }
        }

        for conversation in self.conversations.drain(..) {
            if seen.insert(conversation.id.clone()) {
                merged.push(conversation);
            }
        }

        self.conversations = merged;
        self.sort();
    }

    /// Creates an empty conversation, inserts it at the front and makes it
    /// active.
    ///
    /// Returns the id of the new conversation. The generated id is checked
    /// against the collection once; on the (negligible) collision it is
    /// regenerated before insertion.
    pub fn create_conversation(&mut self) -> String {
        let mut conversation = Conversation::new();
        if self.contains(&conversation.id) {
            conversation.id = ident::conversation_id();
        }

        let id = conversation.id.clone();
        self.conversations.insert(0, conversation);
        self.active_id = Some(id.clone());
        id
    }

    /// Sets the active-conversation pointer.
    ///
    /// No existence check: an unknown id just makes active lookups return
    /// `None`.
    pub fn select_conversation(&mut self, id: impl Into<String>) {
        self.active_id = Some(id.into());
    }

    /// Removes the conversation with the given id.
    ///
    /// Clears the active pointer when it referred to the removed
    /// conversation. Unknown ids are a no-op.
    pub fn delete_conversation(&mut self, id: &str) {
        self.conversations.retain(|c| c.id != id);
        if self.active_id.as_deref() == Some(id) {
            self.active_id = None;
        }
    }

    /// Renames a conversation.
    ///
    /// The title is trimmed; a rename to an empty string is a no-op.
    pub fn rename_conversation(&mut self, id: &str, title: &str) {
        let title = title.trim();
        if title.is_empty() {
            return;
        }

        if let Some(conversation) = self.conversations.iter_mut().find(|c| c.id == id) {
            conversation.title = title.to_string();
            conversation.touch();
            self.sort();
        }
    }

    /// Appends a message to the targeted conversation.
    ///
    /// A `None` or unknown conversation id is a no-op and leaves the store
    /// unchanged. Returns a copy of the appended message otherwise.
    pub fn append_message(
        &mut self,
        conversation_id: Option<&str>,
        role: MessageRole,
        content: &str,
    ) -> Option<ChatMessage> {
        let id = conversation_id?;
        let conversation = self.conversations.iter_mut().find(|c| c.id == id)?;

        let message = ChatMessage::new(role, content);
        conversation.messages.push(message.clone());
        conversation.touch();
        self.sort();
        Some(message)
    }

    /// Derives the conversation title from its first message.
    ///
    /// Applies only while the title is still the placeholder and no message
    /// has been appended yet; otherwise (and for `None`/unknown ids) this is
    /// a no-op.
    pub fn set_title_from_first_message(&mut self, conversation_id: Option<&str>, content: &str) {
        let Some(id) = conversation_id else {
            return;
        };
        let Some(conversation) = self.conversations.iter_mut().find(|c| c.id == id) else {
            return;
        };

        if conversation.has_derivable_title() && conversation.messages.is_empty() {
            conversation.title = derive_title(content);
            conversation.touch();
            self.sort();
        }
    }

    /// Returns the conversations in display order.
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Returns the conversation with the given id.
    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Returns the id the active pointer holds, if any.
    pub fn active_conversation_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// Looks up the active conversation.
    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    fn contains(&self, id: &str) -> bool {
        self.conversations.iter().any(|c| c.id == id)
    }

    // Stable sort keeps the previous relative order for equal timestamps.
    fn sort(&mut self) {
        self.conversations
            .sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    }
}
