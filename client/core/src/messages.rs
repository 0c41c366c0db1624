//! Conversation Data Model
//!
//! Wire and in-memory types shared by the state store, the backend client
//! and UI surfaces.
//!
//! # Design Philosophy
//!
//! The backend is the only authority on identity. Messages carry no local
//! identifier: their position in the list is their ordering. Conversations
//! are identified by the integer id the backend assigns on creation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend-assigned conversation identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ConversationId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Who authored a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person using the client
    User,
    /// Generated by the backend
    Assistant,
}

impl Role {
    /// Wire name of the role
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single chat message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message
    pub role: Role,
    /// Message text
    pub content: String,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A conversation as listed in the sidebar
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Backend-assigned id, immutable once created
    pub id: ConversationId,
    /// Display title
    pub title: String,
}

impl Conversation {
    /// Create a conversation record
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id: ConversationId(id),
            title: title.into(),
        }
    }
}

// ============================================================================
// Request / response bodies
// ============================================================================

/// Body of `POST /conversations/`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewConversation {
    /// Title derived from the first message
    pub title: String,
}

/// Body of `POST /generate-title`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TitleRequest {
    /// Text the title is derived from
    pub content: String,
}

/// Response of `POST /generate-title`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TitleResponse {
    /// Generated title
    pub title: String,
}

/// Error payload returned with non-success statuses
///
/// `detail` is usually a string, but validation failures carry a list of
/// error objects instead.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Failure reason
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// The detail rendered as display text
    #[must_use]
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

// ============================================================================
// Notices
// ============================================================================

/// Notification levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// Warning
    Warning,
    /// Error
    Error,
    /// Success
    Success,
}

/// Feedback meant for the person using the client
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NotifyLevel,
    /// Text to display
    pub message: String,
}

impl Notice {
    /// Create a notice
    pub fn new(level: NotifyLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    /// Error notice
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotifyLevel::Error, message)
    }

    /// Warning notice
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotifyLevel::Warning, message)
    }

    /// Success notice
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotifyLevel::Success, message)
    }
}
