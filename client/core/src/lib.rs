//! DSTL Chat Core - Headless Conversation Sync
//!
//! This crate holds the client-side logic of the DSTL chat application,
//! independent of any UI framework: the data model, the state store, and the
//! protocol that keeps it in sync with the remote conversation service.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      UI Surface                           │
//! │   sidebar  ·  message thread  ·  input  ·  notice bar     │
//! └───────────────┬──────────────────────────▲───────────────┘
//!                 │ ChatEvent (user action)  │ ChatState / Notice
//! ┌───────────────▼──────────────────────────┴───────────────┐
//! │                     ChatState::apply                      │
//! │        (old state, event) -> (new state, effects)         │
//! └───────────────┬──────────────────────────▲───────────────┘
//!                 │ Effect                   │ ChatEvent (completion)
//! ┌───────────────▼──────────────────────────┴───────────────┐
//! │        SyncController / EffectRunner  ->  ChatBackend     │
//! │                  (HttpBackend over reqwest)               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ChatState`]: the state store and its transition function
//! - [`ChatEvent`]: user actions and request completions
//! - [`Effect`]: side-effect descriptions returned by transitions
//! - [`ChatBackend`]: the remote conversation store
//! - [`SyncController`]: runs actions to completion, one request at a time
//! - [`EffectRunner`]: spawns requests for interactive surfaces
//!
//! # Quick Start
//!
//! ```ignore
//! use dstl_chat_core::{ClientConfig, HttpBackend, SyncController};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = HttpBackend::new(&ClientConfig::from_env())?;
//!     let mut controller = SyncController::new(backend);
//!
//!     controller.load_conversations().await;
//!     controller.send_message("hello").await;
//!
//!     for msg in &controller.state().messages {
//!         println!("{}: {}", msg.role.as_str(), msg.content);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod config;
pub mod controller;
pub mod effects;
pub mod error;
pub mod events;
pub mod messages;
pub mod state;

pub use backend::{ChatBackend, HttpBackend};
pub use config::{
    default_config_path, load_config, load_config_from_path, ClientConfig, ConfigError,
    ConfigFile, ConfigOverrides, ConfigSource,
};
pub use controller::{EffectRunner, SyncController};
pub use effects::Effect;
pub use error::{SyncError, SyncResult};
pub use events::{ChatEvent, RequestSeq};
pub use messages::{Conversation, ConversationId, Message, Notice, NotifyLevel, Role};
pub use state::ChatState;
