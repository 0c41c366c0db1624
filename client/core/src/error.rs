//! Sync Errors
//!
//! Failure taxonomy for backend calls: transport failures, non-success
//! statuses, and response bodies that do not match the expected shape.

use thiserror::Error;

/// Errors produced while talking to the chat backend
#[derive(Debug, Error)]
pub enum SyncError {
    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response (connection refused, reset, timeout)
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        /// Method and path of the request
        endpoint: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status
    #[error("{endpoint} returned {status}: {detail}")]
    Status {
        /// Method and path of the request
        endpoint: String,
        /// HTTP status code
        status: u16,
        /// The backend's `detail` field, or the status reason
        detail: String,
    },

    /// The response body did not decode into the expected type
    #[error("unexpected response from {endpoint}: {reason}")]
    Decode {
        /// Method and path of the request
        endpoint: String,
        /// Decoder message
        reason: String,
    },
}

impl SyncError {
    /// Backend-supplied detail, if this is a status error
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// HTTP status code, if the backend answered
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result alias for backend calls
pub type SyncResult<T> = Result<T, SyncError>;
