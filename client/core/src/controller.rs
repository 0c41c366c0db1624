//! Sync Controller
//!
//! Drives the state store against a backend.
//!
//! Two drivers share the same transitions:
//!
//! - [`SyncController`] awaits each request in turn and returns once the
//!   triggering action has fully settled. Headless use and tests.
//! - [`EffectRunner`] spawns each request on the runtime and reports the
//!   completion over a channel, so an interactive surface keeps rendering
//!   while requests are in flight.
//!
//! In both cases the steps of one send (title, creation, persist, reply) are
//! strictly sequential: the next request only exists once the state store
//! has seen the previous completion.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::backend::ChatBackend;
use crate::effects::Effect;
use crate::events::ChatEvent;
use crate::messages::{ConversationId, Notice};
use crate::state::ChatState;

/// Sequential driver for the sync protocol
pub struct SyncController<B: ChatBackend> {
    /// Client state
    state: ChatState,
    /// Remote conversation store
    backend: Arc<B>,
    /// Feedback not yet shown
    notices: Vec<Notice>,
}

impl<B: ChatBackend> SyncController<B> {
    /// Create a controller with empty state
    pub fn new(backend: B) -> Self {
        Self::with_state(Arc::new(backend), ChatState::new())
    }

    /// Create a controller around existing state
    pub fn with_state(backend: Arc<B>, state: ChatState) -> Self {
        Self {
            state,
            backend,
            notices: Vec::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// The backend
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Drain notices produced since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Apply an event and run every resulting request to completion
    pub async fn dispatch(&mut self, event: ChatEvent) {
        let mut queue: VecDeque<Effect> = self.state.apply(event).into();

        while let Some(effect) = queue.pop_front() {
            if let Effect::Notify(notice) = effect {
                self.notices.push(notice);
                continue;
            }

            if let Some(completion) = effect.execute(self.backend.as_ref()).await {
                queue.extend(self.state.apply(completion));
            }
        }
    }

    /// Fetch the conversation list (startup)
    pub async fn load_conversations(&mut self) {
        self.dispatch(ChatEvent::Startup).await;
    }

    /// Replace the input text
    pub fn set_input(&mut self, text: impl Into<String>) {
        // InputChanged never produces effects
        let _ = self.state.apply(ChatEvent::InputChanged(text.into()));
    }

    /// Send `text`, creating a conversation first if none is active
    ///
    /// Blank text is a no-op. If creation fails the text stays in the input.
    pub async fn send_message(&mut self, text: impl Into<String>) {
        self.set_input(text);
        self.dispatch(ChatEvent::SendRequested).await;
    }

    /// Create a conversation titled after `seed` and make it active
    ///
    /// Returns `None` if title generation or creation failed.
    pub async fn create_conversation(&mut self, seed: impl Into<String>) -> Option<ConversationId> {
        let known = self.state.conversations.len();
        self.dispatch(ChatEvent::CreateRequested { seed: seed.into() })
            .await;

        if self.state.conversations.len() > known {
            self.state.active
        } else {
            None
        }
    }

    /// Display a conversation's history
    pub async fn select_conversation(&mut self, conversation_id: ConversationId) {
        self.dispatch(ChatEvent::SelectRequested { conversation_id })
            .await;
    }

    /// Delete a conversation
    pub async fn delete_conversation(&mut self, conversation_id: ConversationId) {
        self.dispatch(ChatEvent::DeleteRequested { conversation_id })
            .await;
    }

    /// Delete the active conversation, if any
    pub async fn delete_active(&mut self) {
        if let Some(conversation_id) = self.state.active {
            self.delete_conversation(conversation_id).await;
        }
    }

    /// Start a fresh chat; the next send creates a conversation
    pub async fn new_chat(&mut self) {
        self.dispatch(ChatEvent::NewChatRequested).await;
    }
}

/// Non-blocking effect executor
///
/// Each request runs on its own task; completions arrive on the receiver
/// returned by [`EffectRunner::new`] and must be fed back into the state
/// store by the owner. Requests from separate actions may overlap; the
/// history sequence guard in the state store discards stale responses.
pub struct EffectRunner<B: ChatBackend + 'static> {
    backend: Arc<B>,
    tx: mpsc::UnboundedSender<ChatEvent>,
}

impl<B: ChatBackend + 'static> Clone for EffectRunner<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            tx: self.tx.clone(),
        }
    }
}

impl<B: ChatBackend + 'static> EffectRunner<B> {
    /// Create a runner and the receiver its completions arrive on
    pub fn new(backend: Arc<B>) -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { backend, tx }, rx)
    }

    /// Spawn the requests among `effects`, returning the notices
    ///
    /// Must be called from within a tokio runtime.
    pub fn run(&self, effects: Vec<Effect>) -> Vec<Notice> {
        let mut notices = Vec::new();

        for effect in effects {
            if let Effect::Notify(notice) = effect {
                notices.push(notice);
                continue;
            }

            let backend = Arc::clone(&self.backend);
            let tx = self.tx.clone();
            tokio::spawn(async move {
                if let Some(completion) = effect.execute(backend.as_ref()).await {
                    if tx.send(completion).is_err() {
                        debug!("Completion dropped, receiver closed");
                    }
                }
            });
        }

        notices
    }
}
