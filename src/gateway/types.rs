//! Operation kinds and the uniform outcome envelope.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The seven gateway operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Read,
    Create,
    Update,
    Delete,
    SignIn,
    SignUp,
    SignOut,
}

impl OpKind {
    /// Stable name used in rate-limit keys, cache keys, and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Read => "read",
            OpKind::Create => "create",
            OpKind::Update => "update",
            OpKind::Delete => "delete",
            OpKind::SignIn => "sign_in",
            OpKind::SignUp => "sign_up",
            OpKind::SignOut => "sign_out",
        }
    }

    /// Whether this operation invalidates the resource's cache partition.
    pub fn is_mutation(&self) -> bool {
        matches!(self, OpKind::Create | OpKind::Update | OpKind::Delete)
    }
}

/// Terminal status of one gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    Error,
    Timeout,
    RetryExhausted,
}

/// Uniform result envelope returned by every gateway operation.
///
/// The pipeline never propagates an error past the gateway boundary;
/// callers inspect `status` instead of catching anything. Immutable once
/// produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    /// Payload on success, absent otherwise.
    pub data: Option<Value>,

    /// Last underlying error message on failure.
    pub error: Option<String>,

    /// Terminal status.
    pub status: OutcomeStatus,

    /// Wall-clock completion time (milliseconds since epoch).
    #[serde(rename = "timestamp")]
    pub timestamp_ms: u64,

    /// Total call duration in milliseconds, backoff delays included.
    #[serde(rename = "duration")]
    pub duration_ms: u64,

    /// Retries used; always ≤ the configured maximum.
    pub retries: u32,
}

impl Outcome {
    /// Successful outcome wrapping `data`.
    pub fn success(data: Value, duration: Duration, retries: u32) -> Self {
        Self {
            data: Some(data),
            error: None,
            status: OutcomeStatus::Success,
            timestamp_ms: now_ms(),
            duration_ms: duration.as_millis() as u64,
            retries,
        }
    }

    /// Failed outcome with the given terminal status.
    pub fn failure(status: OutcomeStatus, error: String, duration: Duration, retries: u32) -> Self {
        Self {
            data: None,
            error: Some(error),
            status,
            timestamp_ms: now_ms(),
            duration_ms: duration.as_millis() as u64,
            retries,
        }
    }

    /// Whether the call succeeded.
    pub fn is_success(&self) -> bool {
        self.status == OutcomeStatus::Success
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&OutcomeStatus::RetryExhausted).unwrap(),
            r#""retry_exhausted""#
        );
        assert_eq!(
            serde_json::to_string(&OutcomeStatus::Timeout).unwrap(),
            r#""timeout""#
        );
    }

    #[test]
    fn test_envelope_field_names() {
        let outcome = Outcome::success(json!([1]), Duration::from_millis(12), 1);
        let encoded = serde_json::to_value(&outcome).unwrap();

        assert_eq!(encoded["status"], "success");
        assert_eq!(encoded["duration"], 12);
        assert_eq!(encoded["retries"], 1);
        assert!(encoded["timestamp"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_mutation_kinds() {
        assert!(OpKind::Create.is_mutation());
        assert!(OpKind::Delete.is_mutation());
        assert!(!OpKind::Read.is_mutation());
        assert!(!OpKind::SignOut.is_mutation());
    }

    #[test]
    fn test_failure_outcome() {
        let outcome = Outcome::failure(
            OutcomeStatus::Error,
            "boom".to_string(),
            Duration::from_millis(3),
            0,
        );
        assert!(!outcome.is_success());
        assert!(outcome.data.is_none());
        assert_eq!(outcome.error.as_deref(), Some("boom"));
    }
}
