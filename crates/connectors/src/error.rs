use crate::auth::error::AuthError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    /// The configured endpoint is not a usable absolute URL.
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// The request never produced a response (DNS, connect, reset, ...).
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The endpoint answered with a non-2xx status.
    #[error("List endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The body could not be read as `{ items, continuationToken }`.
    #[error("Malformed response body: {0}")]
    Malformed(String),

    /// No access token could be acquired; no request was sent.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl AdapterError {
    /// Failures worth one more attempt: the request may succeed unchanged.
    pub fn is_transient(&self) -> bool {
        match self {
            AdapterError::Transport(_) | AdapterError::Timeout(_) => true,
            AdapterError::Status { status, .. } => {
                matches!(*status, 408 | 429) || (500..=599).contains(status)
            }
            AdapterError::InvalidEndpoint { .. }
            | AdapterError::Malformed(_)
            | AdapterError::Auth(_)
            | AdapterError::Client(_) => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            AdapterError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
