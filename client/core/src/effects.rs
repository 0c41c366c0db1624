//! Effects
//!
//! Side-effect descriptions returned by the state store. An effect is data:
//! it says which backend call to make, and [`Effect::execute`] turns it into
//! the completion event that feeds back into the state store.

use tracing::{debug, warn};

use crate::backend::ChatBackend;
use crate::events::{ChatEvent, RequestSeq};
use crate::messages::{ConversationId, Notice};

/// A side effect requested by a state transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the conversation list
    ListConversations,
    /// Derive a title from the first message
    GenerateTitle {
        /// Text the title is derived from
        seed: String,
    },
    /// Create a conversation row
    CreateConversation {
        /// Generated title
        title: String,
    },
    /// Persist a user message and obtain the assistant reply
    PersistMessage {
        /// Target conversation
        conversation_id: ConversationId,
        /// User message text
        content: String,
    },
    /// Fetch a conversation's history
    FetchHistory {
        /// Conversation to fetch
        conversation_id: ConversationId,
        /// Sequence number of this request
        seq: RequestSeq,
    },
    /// Delete a conversation
    DeleteConversation {
        /// Conversation to delete
        conversation_id: ConversationId,
    },
    /// Show feedback to the user
    Notify(Notice),
}

impl Effect {
    /// Whether this effect needs the backend
    #[must_use]
    pub fn is_request(&self) -> bool {
        !matches!(self, Self::Notify(_))
    }

    /// Perform the backend call described by this effect
    ///
    /// Returns the completion event, or `None` for [`Effect::Notify`], which
    /// is routed to the surface instead.
    pub async fn execute<B>(self, backend: &B) -> Option<ChatEvent>
    where
        B: ChatBackend + ?Sized,
    {
        let event = match self {
            Self::ListConversations => ChatEvent::ConversationsLoaded(
                backend.list_conversations().await,
            ),
            Self::GenerateTitle { seed } => {
                ChatEvent::TitleGenerated(backend.generate_title(&seed).await)
            }
            Self::CreateConversation { title } => {
                ChatEvent::ConversationCreated(backend.create_conversation(&title).await)
            }
            Self::PersistMessage {
                conversation_id,
                content,
            } => ChatEvent::ReplyReceived {
                conversation_id,
                result: backend.post_message(conversation_id, &content).await,
            },
            Self::FetchHistory {
                conversation_id,
                seq,
            } => ChatEvent::HistoryLoaded {
                conversation_id,
                seq,
                result: backend.fetch_messages(conversation_id).await,
            },
            Self::DeleteConversation { conversation_id } => ChatEvent::ConversationDeleted {
                conversation_id,
                result: backend.delete_conversation(conversation_id).await,
            },
            Self::Notify(_) => return None,
        };

        if let Some(err) = completion_error(&event) {
            warn!(
                backend = backend.name(),
                event = event.name(),
                error = %err,
                "Backend request failed"
            );
        } else {
            debug!(backend = backend.name(), event = event.name(), "Backend request completed");
        }

        Some(event)
    }
}

fn completion_error(event: &ChatEvent) -> Option<&crate::error::SyncError> {
    match event {
        ChatEvent::ConversationsLoaded(Err(e))
        | ChatEvent::TitleGenerated(Err(e))
        | ChatEvent::ConversationCreated(Err(e)) => Some(e),
        ChatEvent::ReplyReceived { result: Err(e), .. }
        | ChatEvent::HistoryLoaded { result: Err(e), .. }
        | ChatEvent::ConversationDeleted { result: Err(e), .. } => Some(e),
        _ => None,
    }
}
