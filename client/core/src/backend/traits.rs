//! Chat Backend Traits
//!
//! The state store never talks to the network directly. Effects are executed
//! against a [`ChatBackend`], so the whole sync protocol can run against an
//! in-memory backend in tests.

use async_trait::async_trait;

use crate::error::SyncResult;
use crate::messages::{Conversation, ConversationId, Message};

/// Remote conversation store
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Get the backend name (for logs)
    fn name(&self) -> &str;

    /// `GET /conversations/`
    async fn list_conversations(&self) -> SyncResult<Vec<Conversation>>;

    /// `POST /conversations/`
    async fn create_conversation(&self, title: &str) -> SyncResult<Conversation>;

    /// `DELETE /conversations/{id}`
    async fn delete_conversation(&self, id: ConversationId) -> SyncResult<()>;

    /// `GET /conversations/{id}/messages`
    async fn fetch_messages(&self, id: ConversationId) -> SyncResult<Vec<Message>>;

    /// `POST /conversations/{id}/messages`
    ///
    /// Persists the user message and returns the assistant's reply.
    async fn post_message(&self, id: ConversationId, content: &str) -> SyncResult<Message>;

    /// `POST /generate-title`
    async fn generate_title(&self, content: &str) -> SyncResult<String>;
}
