//! Chat State Store
//!
//! Holds everything the client knows: the active message list, the known
//! conversations, the input text and the active conversation. All changes go
//! through [`ChatState::apply`], a deterministic transition that returns the
//! backend calls to make next instead of making them.
//!
//! # Invariants
//!
//! - `messages` always belongs to exactly one conversation: either a fresh,
//!   empty chat or the conversation named by `active`.
//! - Input is cleared as soon as a message is queued, before the round trip.
//! - A conversation is only created when a message is sent with nothing
//!   active, and its title is generated before the row is created.
//! - Only the most recently issued history request may replace `messages`.

use tracing::{debug, warn};

use crate::effects::Effect;
use crate::error::SyncError;
use crate::events::{ChatEvent, RequestSeq};
use crate::messages::{Conversation, ConversationId, Message, Notice, Role};

/// A conversation creation in flight
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingCreation {
    /// Text to send once the conversation exists
    pub queued_text: Option<String>,
}

/// Client-side state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatState {
    /// Messages of the displayed conversation, in conversation order
    pub messages: Vec<Message>,
    /// Known conversations, in backend order
    pub conversations: Vec<Conversation>,
    /// Current input text
    pub input: String,
    /// Conversation targeted by send and delete (`None` = next send creates one)
    pub active: Option<ConversationId>,
    /// Creation in flight, if any
    pending_creation: Option<PendingCreation>,
    /// Latest issued history request
    history_seq: RequestSeq,
}

impl ChatState {
    /// Empty state, as at startup
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a conversation is being created
    #[must_use]
    pub fn is_creating(&self) -> bool {
        self.pending_creation.is_some()
    }

    /// Sequence number of the latest history request
    #[must_use]
    pub fn history_seq(&self) -> RequestSeq {
        self.history_seq
    }

    /// Whether the current input would be sent
    #[must_use]
    pub fn can_send(&self) -> bool {
        !self.input.trim().is_empty() && self.pending_creation.is_none()
    }

    /// The active conversation record, if it is in the list
    #[must_use]
    pub fn active_conversation(&self) -> Option<&Conversation> {
        let active = self.active?;
        self.conversations.iter().find(|c| c.id == active)
    }

    /// Apply an event, returning the effects to run next
    pub fn apply(&mut self, event: ChatEvent) -> Vec<Effect> {
        debug!(event = event.name(), "Applying event");

        match event {
            ChatEvent::Startup => vec![Effect::ListConversations],

            ChatEvent::InputChanged(text) => {
                self.input = text;
                Vec::new()
            }

            ChatEvent::SendRequested => self.on_send_requested(),

            ChatEvent::CreateRequested { seed } => {
                if self.pending_creation.is_some() {
                    debug!("Creation already pending, ignoring create request");
                    return Vec::new();
                }
                self.pending_creation = Some(PendingCreation { queued_text: None });
                vec![Effect::GenerateTitle { seed }]
            }

            ChatEvent::TitleGenerated(result) => self.on_title_generated(result),

            ChatEvent::ConversationCreated(result) => self.on_conversation_created(result),

            ChatEvent::ReplyReceived {
                conversation_id,
                result,
            } => self.on_reply_received(conversation_id, result),

            ChatEvent::SelectRequested { conversation_id } => {
                self.history_seq += 1;
                vec![Effect::FetchHistory {
                    conversation_id,
                    seq: self.history_seq,
                }]
            }

            ChatEvent::HistoryLoaded {
                conversation_id,
                seq,
                result,
            } => self.on_history_loaded(conversation_id, seq, result),

            ChatEvent::NewChatRequested => {
                self.reset_thread();
                Vec::new()
            }

            ChatEvent::DeleteRequested { conversation_id } => {
                vec![Effect::DeleteConversation { conversation_id }]
            }

            ChatEvent::ConversationDeleted {
                conversation_id,
                result,
            } => self.on_conversation_deleted(conversation_id, result),

            ChatEvent::ConversationsLoaded(result) => match result {
                Ok(conversations) => {
                    self.conversations = conversations;
                    Vec::new()
                }
                Err(e) => vec![notify_error("Failed to load conversations", &e)],
            },
        }
    }

    fn on_send_requested(&mut self) -> Vec<Effect> {
        if self.input.trim().is_empty() {
            return Vec::new();
        }

        if self.pending_creation.is_some() {
            debug!("Creation pending, ignoring send");
            return Vec::new();
        }

        match self.active {
            Some(conversation_id) => {
                let content = std::mem::take(&mut self.input);
                self.messages.push(Message::user(content.clone()));
                vec![Effect::PersistMessage {
                    conversation_id,
                    content,
                }]
            }
            None => {
                let seed = self.input.clone();
                self.pending_creation = Some(PendingCreation {
                    queued_text: Some(seed.clone()),
                });
                vec![Effect::GenerateTitle { seed }]
            }
        }
    }

    fn on_title_generated(&mut self, result: Result<String, SyncError>) -> Vec<Effect> {
        if self.pending_creation.is_none() {
            warn!("Title arrived with no creation pending");
            return Vec::new();
        }

        match result {
            Ok(title) => vec![Effect::CreateConversation { title }],
            Err(e) => {
                self.pending_creation = None;
                vec![notify_error("Failed to create conversation", &e)]
            }
        }
    }

    fn on_conversation_created(&mut self, result: Result<Conversation, SyncError>) -> Vec<Effect> {
        let Some(pending) = self.pending_creation.take() else {
            warn!("Conversation created with no creation pending");
            return Vec::new();
        };

        let conversation = match result {
            Ok(conversation) => conversation,
            Err(e) => return vec![notify_error("Failed to create conversation", &e)],
        };

        let conversation_id = conversation.id;
        debug!(%conversation_id, title = %conversation.title, "Conversation created");

        self.conversations.push(conversation);
        self.reset_thread();
        self.active = Some(conversation_id);

        match pending.queued_text {
            Some(content) => {
                self.messages.push(Message::user(content.clone()));
                // keep anything typed while the creation was in flight
                if let Some(rest) = self.input.strip_prefix(content.as_str()) {
                    self.input = rest.to_string();
                }
                vec![Effect::PersistMessage {
                    conversation_id,
                    content,
                }]
            }
            None => Vec::new(),
        }
    }

    fn on_reply_received(
        &mut self,
        conversation_id: ConversationId,
        result: Result<Message, SyncError>,
    ) -> Vec<Effect> {
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => return vec![notify_warning("Message was not saved", &e)],
        };

        if self.active != Some(conversation_id) {
            debug!(%conversation_id, "Reply for inactive conversation dropped");
            return Vec::new();
        }

        if reply.role != Role::Assistant {
            warn!(%conversation_id, "Backend echoed a non-assistant message, not appending");
            return Vec::new();
        }

        self.messages.push(reply);
        Vec::new()
    }

    fn on_history_loaded(
        &mut self,
        conversation_id: ConversationId,
        seq: RequestSeq,
        result: Result<Vec<Message>, SyncError>,
    ) -> Vec<Effect> {
        if seq != self.history_seq {
            debug!(%conversation_id, seq, latest = self.history_seq, "Stale history discarded");
            return Vec::new();
        }

        match result {
            Ok(messages) => {
                self.messages = messages;
                self.active = Some(conversation_id);
                Vec::new()
            }
            Err(e) => vec![notify_error("Failed to load messages", &e)],
        }
    }

    fn on_conversation_deleted(
        &mut self,
        conversation_id: ConversationId,
        result: Result<(), SyncError>,
    ) -> Vec<Effect> {
        if let Err(e) = result {
            let reason = e
                .detail()
                .map_or_else(|| e.to_string(), ToString::to_string);
            return vec![Effect::Notify(Notice::error(format!(
                "Failed to delete conversation: {reason}"
            )))];
        }

        let title = self
            .conversations
            .iter()
            .find(|c| c.id == conversation_id)
            .map(|c| c.title.clone());
        self.conversations.retain(|c| c.id != conversation_id);

        if self.active == Some(conversation_id) {
            self.reset_thread();
        }

        let label = title.unwrap_or_else(|| format!("#{conversation_id}"));
        vec![Effect::Notify(Notice::success(format!("Deleted \"{label}\"")))]
    }

    /// Back to an empty, unselected thread
    ///
    /// Bumping the sequence number makes any in-flight history response stale.
    fn reset_thread(&mut self) {
        self.messages.clear();
        self.active = None;
        self.history_seq += 1;
    }
}

fn notify_error(context: &str, err: &SyncError) -> Effect {
    Effect::Notify(Notice::error(format!("{context}: {err}")))
}

fn notify_warning(context: &str, err: &SyncError) -> Effect {
    Effect::Notify(Notice::warning(format!("{context}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::NotifyLevel;
    use pretty_assertions::assert_eq;

    fn server_error() -> SyncError {
        SyncError::Status {
            endpoint: "POST /generate-title".to_string(),
            status: 500,
            detail: "Internal Server Error".to_string(),
        }
    }

    fn state_with_active(id: i64) -> ChatState {
        let mut state = ChatState::new();
        state.conversations = vec![Conversation::new(id, "Existing")];
        state.active = Some(ConversationId(id));
        state
    }

    #[test]
    fn test_startup_lists_conversations() {
        let mut state = ChatState::new();
        assert_eq!(state.apply(ChatEvent::Startup), vec![Effect::ListConversations]);
    }

    #[test]
    fn test_blank_send_is_noop() {
        for input in ["", "   ", "\n\t "] {
            let mut state = ChatState::new();
            state.apply(ChatEvent::InputChanged(input.to_string()));
            let before = state.clone();

            let effects = state.apply(ChatEvent::SendRequested);
            assert!(effects.is_empty());
            assert_eq!(state, before);
        }
    }

    #[test]
    fn test_send_with_active_conversation_echoes_and_clears() {
        let mut state = state_with_active(4);
        state.apply(ChatEvent::InputChanged("hello".to_string()));

        let effects = state.apply(ChatEvent::SendRequested);

        assert_eq!(state.messages, vec![Message::user("hello")]);
        assert_eq!(state.input, "");
        assert_eq!(
            effects,
            vec![Effect::PersistMessage {
                conversation_id: ConversationId(4),
                content: "hello".to_string(),
            }]
        );
    }

    #[test]
    fn test_send_without_active_starts_with_title() {
        let mut state = ChatState::new();
        state.apply(ChatEvent::InputChanged("hello".to_string()));

        let effects = state.apply(ChatEvent::SendRequested);

        assert_eq!(
            effects,
            vec![Effect::GenerateTitle {
                seed: "hello".to_string()
            }]
        );
        // nothing shown or cleared until the conversation exists
        assert!(state.messages.is_empty());
        assert_eq!(state.input, "hello");
        assert!(state.is_creating());
        assert!(!state.can_send());
    }

    #[test]
    fn test_second_send_during_creation_ignored() {
        let mut state = ChatState::new();
        state.apply(ChatEvent::InputChanged("hello".to_string()));
        state.apply(ChatEvent::SendRequested);

        assert!(state.apply(ChatEvent::SendRequested).is_empty());
    }

    #[test]
    fn test_title_then_create_then_persist() {
        let mut state = ChatState::new();
        state.apply(ChatEvent::InputChanged("hello".to_string()));
        state.apply(ChatEvent::SendRequested);

        let effects = state.apply(ChatEvent::TitleGenerated(Ok("Greeting".to_string())));
        assert_eq!(
            effects,
            vec![Effect::CreateConversation {
                title: "Greeting".to_string()
            }]
        );

        let effects = state.apply(ChatEvent::ConversationCreated(Ok(Conversation::new(
            1, "Greeting",
        ))));
        assert_eq!(
            effects,
            vec![Effect::PersistMessage {
                conversation_id: ConversationId(1),
                content: "hello".to_string(),
            }]
        );
        assert_eq!(state.active, Some(ConversationId(1)));
        assert_eq!(state.conversations, vec![Conversation::new(1, "Greeting")]);
        assert_eq!(state.messages, vec![Message::user("hello")]);
        assert_eq!(state.input, "");
        assert!(!state.is_creating());

        let effects = state.apply(ChatEvent::ReplyReceived {
            conversation_id: ConversationId(1),
            result: Ok(Message::assistant("Hi there")),
        });
        assert!(effects.is_empty());
        assert_eq!(
            state.messages,
            vec![Message::user("hello"), Message::assistant("Hi there")]
        );
    }

    #[test]
    fn test_input_typed_during_creation_survives() {
        let mut state = ChatState::new();
        state.apply(ChatEvent::InputChanged("hello".to_string()));
        state.apply(ChatEvent::SendRequested);
        state.apply(ChatEvent::InputChanged("hello, and a follow-up".to_string()));

        state.apply(ChatEvent::TitleGenerated(Ok("Greeting".to_string())));
        let effects = state.apply(ChatEvent::ConversationCreated(Ok(Conversation::new(
            1, "Greeting",
        ))));

        assert_eq!(
            effects,
            vec![Effect::PersistMessage {
                conversation_id: ConversationId(1),
                content: "hello".to_string(),
            }]
        );
        assert_eq!(state.messages, vec![Message::user("hello")]);
        assert_eq!(state.input, ", and a follow-up");
    }

    #[test]
    fn test_rewritten_input_kept_after_creation() {
        let mut state = ChatState::new();
        state.apply(ChatEvent::InputChanged("hello".to_string()));
        state.apply(ChatEvent::SendRequested);
        state.apply(ChatEvent::InputChanged("something else".to_string()));

        state.apply(ChatEvent::TitleGenerated(Ok("Greeting".to_string())));
        state.apply(ChatEvent::ConversationCreated(Ok(Conversation::new(
            1, "Greeting",
        ))));

        assert_eq!(state.messages, vec![Message::user("hello")]);
        assert_eq!(state.input, "something else");
    }

    #[test]
    fn test_title_failure_aborts_send() {
        let mut state = ChatState::new();
        state.apply(ChatEvent::InputChanged("hello".to_string()));
        state.apply(ChatEvent::SendRequested);

        let effects = state.apply(ChatEvent::TitleGenerated(Err(server_error())));

        assert_eq!(effects.len(), 1);
        assert!(matches!(
            &effects[0],
            Effect::Notify(Notice { level: NotifyLevel::Error, .. })
        ));
        assert!(state.messages.is_empty());
        assert_eq!(state.input, "hello");
        assert_eq!(state.active, None);
        assert!(!state.is_creating());
    }

    #[test]
    fn test_create_failure_aborts_send() {
        let mut state = ChatState::new();
        state.apply(ChatEvent::InputChanged("hello".to_string()));
        state.apply(ChatEvent::SendRequested);
        state.apply(ChatEvent::TitleGenerated(Ok("Greeting".to_string())));

        let effects = state.apply(ChatEvent::ConversationCreated(Err(server_error())));

        assert_eq!(effects.len(), 1);
        assert!(state.conversations.is_empty());
        assert!(state.messages.is_empty());
        assert_eq!(state.input, "hello");
        assert_eq!(state.active, None);
    }

    #[test]
    fn test_reply_failure_keeps_local_echo() {
        let mut state = state_with_active(2);
        state.apply(ChatEvent::InputChanged("are you there".to_string()));
        state.apply(ChatEvent::SendRequested);

        let effects = state.apply(ChatEvent::ReplyReceived {
            conversation_id: ConversationId(2),
            result: Err(server_error()),
        });

        assert!(matches!(
            &effects[0],
            Effect::Notify(Notice { level: NotifyLevel::Warning, .. })
        ));
        assert_eq!(state.messages, vec![Message::user("are you there")]);
    }

    #[test]
    fn test_reply_for_other_conversation_dropped() {
        let mut state = state_with_active(2);
        state.apply(ChatEvent::ReplyReceived {
            conversation_id: ConversationId(9),
            result: Ok(Message::assistant("late")),
        });
        assert!(state.messages.is_empty());
    }

    #[test]
    fn test_echoed_user_reply_not_appended() {
        let mut state = state_with_active(2);
        state.apply(ChatEvent::ReplyReceived {
            conversation_id: ConversationId(2),
            result: Ok(Message::user("echo")),
        });
        assert!(state.messages.is_empty());
    }

    #[test]
    fn test_select_replaces_messages_wholesale() {
        let mut state = state_with_active(1);
        state.messages = vec![Message::user("old"), Message::assistant("older")];

        let effects = state.apply(ChatEvent::SelectRequested {
            conversation_id: ConversationId(5),
        });
        let seq = state.history_seq();
        assert_eq!(
            effects,
            vec![Effect::FetchHistory {
                conversation_id: ConversationId(5),
                seq,
            }]
        );

        let fetched = vec![Message::user("q"), Message::assistant("a")];
        state.apply(ChatEvent::HistoryLoaded {
            conversation_id: ConversationId(5),
            seq,
            result: Ok(fetched.clone()),
        });

        assert_eq!(state.messages, fetched);
        assert_eq!(state.active, Some(ConversationId(5)));
    }

    #[test]
    fn test_stale_history_discarded() {
        let mut state = ChatState::new();
        state.apply(ChatEvent::SelectRequested {
            conversation_id: ConversationId(1),
        });
        let first_seq = state.history_seq();
        state.apply(ChatEvent::SelectRequested {
            conversation_id: ConversationId(2),
        });
        let second_seq = state.history_seq();

        state.apply(ChatEvent::HistoryLoaded {
            conversation_id: ConversationId(2),
            seq: second_seq,
            result: Ok(vec![Message::user("two")]),
        });
        // slow response for the first click arrives last
        state.apply(ChatEvent::HistoryLoaded {
            conversation_id: ConversationId(1),
            seq: first_seq,
            result: Ok(vec![Message::user("one")]),
        });

        assert_eq!(state.active, Some(ConversationId(2)));
        assert_eq!(state.messages, vec![Message::user("two")]);
    }

    #[test]
    fn test_select_failure_leaves_state() {
        let mut state = state_with_active(1);
        state.messages = vec![Message::user("keep")];
        state.apply(ChatEvent::SelectRequested {
            conversation_id: ConversationId(3),
        });
        let seq = state.history_seq();
        let before = state.clone();

        let effects = state.apply(ChatEvent::HistoryLoaded {
            conversation_id: ConversationId(3),
            seq,
            result: Err(server_error()),
        });

        assert_eq!(effects.len(), 1);
        assert_eq!(state, before);
    }

    #[test]
    fn test_new_chat_invalidates_pending_selection() {
        let mut state = state_with_active(1);
        state.apply(ChatEvent::SelectRequested {
            conversation_id: ConversationId(3),
        });
        let seq = state.history_seq();
        state.apply(ChatEvent::NewChatRequested);

        state.apply(ChatEvent::HistoryLoaded {
            conversation_id: ConversationId(3),
            seq,
            result: Ok(vec![Message::user("late")]),
        });

        assert!(state.messages.is_empty());
        assert_eq!(state.active, None);
    }

    #[test]
    fn test_delete_active_clears_thread() {
        let mut state = state_with_active(1);
        state.conversations.push(Conversation::new(2, "Other"));
        state.messages = vec![Message::user("bye")];

        state.apply(ChatEvent::ConversationDeleted {
            conversation_id: ConversationId(1),
            result: Ok(()),
        });

        assert_eq!(state.conversations, vec![Conversation::new(2, "Other")]);
        assert!(state.messages.is_empty());
        assert_eq!(state.active, None);
    }

    #[test]
    fn test_delete_other_keeps_thread() {
        let mut state = state_with_active(1);
        state.conversations.push(Conversation::new(2, "Other"));
        state.messages = vec![Message::user("stay")];

        state.apply(ChatEvent::ConversationDeleted {
            conversation_id: ConversationId(2),
            result: Ok(()),
        });

        assert_eq!(state.conversations, vec![Conversation::new(1, "Existing")]);
        assert_eq!(state.messages, vec![Message::user("stay")]);
        assert_eq!(state.active, Some(ConversationId(1)));
    }

    #[test]
    fn test_delete_failure_surfaces_detail() {
        let mut state = state_with_active(1);
        let effects = state.apply(ChatEvent::ConversationDeleted {
            conversation_id: ConversationId(1),
            result: Err(SyncError::Status {
                endpoint: "DELETE /conversations/1".to_string(),
                status: 404,
                detail: "Conversation not found".to_string(),
            }),
        });

        assert_eq!(
            effects,
            vec![Effect::Notify(Notice::error(
                "Failed to delete conversation: Conversation not found"
            ))]
        );
        assert_eq!(state.conversations.len(), 1);
        assert_eq!(state.active, Some(ConversationId(1)));
    }

    #[test]
    fn test_create_request_without_text() {
        let mut state = ChatState::new();
        state.apply(ChatEvent::CreateRequested {
            seed: "topic".to_string(),
        });
        state.apply(ChatEvent::TitleGenerated(Ok("Topic".to_string())));
        let effects = state.apply(ChatEvent::ConversationCreated(Ok(Conversation::new(
            8, "Topic",
        ))));

        assert!(effects.is_empty());
        assert_eq!(state.active, Some(ConversationId(8)));
        assert!(state.messages.is_empty());
    }
}
