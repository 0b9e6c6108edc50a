//! Backend-facing types and error definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::resilience::DeadlineExceeded;

/// Errors that can occur talking to the remote backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection or protocol-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    /// A single attempt exceeded its deadline.
    #[error("attempt timed out after {limit_ms} ms")]
    Timeout { limit_ms: u64 },

    /// The response body could not be decoded.
    #[error("invalid response payload: {0}")]
    Decode(String),

    /// The operation requires a signed-in session.
    #[error("no active session")]
    NoSession,
}

impl BackendError {
    /// Whether this failure was a per-attempt timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, BackendError::Timeout { .. })
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        BackendError::Transport(e.to_string())
    }
}

impl From<DeadlineExceeded> for BackendError {
    fn from(e: DeadlineExceeded) -> Self {
        BackendError::Timeout {
            limit_ms: e.limit_ms,
        }
    }
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Sign-in / sign-up credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Session material returned by a successful auth call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for authenticated endpoints.
    pub access_token: String,

    /// Token used to mint a fresh access token, when the backend issues one.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// The signed-in user object as the backend returned it.
    #[serde(default)]
    pub user: Value,
}

/// JSON envelope used by the auth endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthEnvelope {
    pub status: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}
