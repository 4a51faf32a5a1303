//! Error types for Spaces client operations.

use std::time::Duration;
use thiserror::Error;

/// Result type for Spaces client operations.
pub type Result<T> = std::result::Result<T, SpacesError>;

/// Errors that can occur while authenticating, talking to the REST API or
/// driving the real-time session.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SpacesError {
    #[error("Not authenticated: no access token available")]
    NotAuthenticated,

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Real-time transport is already connected")]
    AlreadyConnected,

    #[error("Real-time transport is not connected")]
    NotConnected,

    #[error("Real-time authentication rejected: {0}")]
    AuthenticationRejected(serde_json::Value),

    #[error("Timed out after {0:?} waiting for the chat namespace to connect")]
    ConnectTimeout(Duration),

    #[error("Session is already started")]
    AlreadyStarted,

    #[error("Session is not started")]
    NotStarted,

    #[error("Not in a group space")]
    NotInChannel,

    #[error("Invalid space id: {0:?}")]
    InvalidSpaceId(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for SpacesError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => SpacesError::Http {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None => SpacesError::Request(err.to_string()),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for SpacesError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        SpacesError::Transport(err.to_string())
    }
}

impl SpacesError {
    /// Check if the backend refused our credentials.
    #[inline]
    #[must_use]
    pub fn is_access_denied(&self) -> bool {
        match self {
            SpacesError::Http { status, .. } => matches!(status, 401 | 403),
            SpacesError::AuthenticationRejected(_) => true,
            _ => false,
        }
    }

    /// Check if this error comes from calling an operation in the wrong
    /// lifecycle state rather than from the network.
    #[inline]
    #[must_use]
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            SpacesError::NotAuthenticated
                | SpacesError::AlreadyConnected
                | SpacesError::NotConnected
                | SpacesError::AlreadyStarted
                | SpacesError::NotStarted
                | SpacesError::NotInChannel
        )
    }
}
