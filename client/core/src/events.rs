//! Chat Events
//!
//! Everything that can change the state store: actions taken by the user on
//! a surface, and completions of backend requests issued by effects.
//!
//! # Design Philosophy
//!
//! Surfaces report what happened; they never mutate state themselves. Each
//! event goes through [`ChatState::apply`](crate::state::ChatState::apply),
//! which decides what changes and which requests to issue next.

use crate::error::SyncResult;
use crate::messages::{Conversation, ConversationId, Message};

/// Sequence number tagging history requests
///
/// Only the response carrying the latest issued number may update state.
pub type RequestSeq = u64;

/// Events consumed by the state store
#[derive(Debug)]
pub enum ChatEvent {
    // ============================================
    // User Actions
    // ============================================
    /// The client started; fetch the conversation list
    Startup,

    /// The input text changed
    InputChanged(String),

    /// The user asked to send the current input
    SendRequested,

    /// Create a conversation titled after `seed` without sending anything
    CreateRequested {
        /// Text the title is derived from
        seed: String,
    },

    /// The user picked a conversation in the sidebar
    SelectRequested {
        /// Conversation to display
        conversation_id: ConversationId,
    },

    /// The user started a fresh chat
    NewChatRequested,

    /// The user asked to delete a conversation
    DeleteRequested {
        /// Conversation to delete
        conversation_id: ConversationId,
    },

    // ============================================
    // Backend Completions
    // ============================================
    /// `GET /conversations/` finished
    ConversationsLoaded(SyncResult<Vec<Conversation>>),

    /// `POST /generate-title` finished
    TitleGenerated(SyncResult<String>),

    /// `POST /conversations/` finished
    ConversationCreated(SyncResult<Conversation>),

    /// `POST /conversations/{id}/messages` finished
    ReplyReceived {
        /// Conversation the message was posted to
        conversation_id: ConversationId,
        /// The backend's reply
        result: SyncResult<Message>,
    },

    /// `GET /conversations/{id}/messages` finished
    HistoryLoaded {
        /// Conversation whose history was fetched
        conversation_id: ConversationId,
        /// Sequence number of the request
        seq: RequestSeq,
        /// Fetched history
        result: SyncResult<Vec<Message>>,
    },

    /// `DELETE /conversations/{id}` finished
    ConversationDeleted {
        /// Conversation that was deleted
        conversation_id: ConversationId,
        /// Outcome of the request
        result: SyncResult<()>,
    },
}

impl ChatEvent {
    /// Short name used in logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::InputChanged(_) => "input_changed",
            Self::SendRequested => "send_requested",
            Self::CreateRequested { .. } => "create_requested",
            Self::SelectRequested { .. } => "select_requested",
            Self::NewChatRequested => "new_chat_requested",
            Self::DeleteRequested { .. } => "delete_requested",
            Self::ConversationsLoaded(_) => "conversations_loaded",
            Self::TitleGenerated(_) => "title_generated",
            Self::ConversationCreated(_) => "conversation_created",
            Self::ReplyReceived { .. } => "reply_received",
            Self::HistoryLoaded { .. } => "history_loaded",
            Self::ConversationDeleted { .. } => "conversation_deleted",
        }
    }
}
