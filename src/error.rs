use std::fmt;

use serde_json::Value as JsonValue;

/// Last observed cause of a failed attempt, carried into [`GettrError::Api`]
/// so callers can tell a dead network from an upstream refusal.
#[derive(Clone, Debug, PartialEq)]
pub enum FailureDetail {
    /// Request never produced a usable response (timeout, connect failure,
    /// interrupted body read). Holds the transport error text.
    Transport(String),
    /// Retryable HTTP status (429, 500, 502, 503, 504).
    Status(u16),
    /// Application-level `error` payload from the response envelope.
    Api(JsonValue),
    /// Body was not JSON, or was JSON with neither the success key nor an
    /// `error` key. Holds a truncated body excerpt.
    Malformed(String),
}

impl fmt::Display for FailureDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "transport failure: {message}"),
            Self::Status(code) => write!(f, "http status {code}"),
            Self::Api(payload) => write!(f, "api error payload: {payload}"),
            Self::Malformed(body) => write!(f, "malformed response: {body}"),
        }
    }
}

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum GettrError {
    /// Retry budget exhausted without a successful envelope extraction.
    #[error("api error after {tries} attempt(s): {detail}")]
    Api {
        /// Attempts actually made before giving up.
        tries: u32,
        /// Most recently recorded failure cause.
        detail: FailureDetail,
    },
    /// A retry budget of 0 was requested, so no attempt was made.
    #[error("retries must be at least 1 for a request to be issued")]
    NoAttempts,
}

impl GettrError {
    /// Failure detail from the final attempt, if any attempt was made.
    pub fn detail(&self) -> Option<&FailureDetail> {
        match self {
            Self::Api { detail, .. } => Some(detail),
            Self::NoAttempts => None,
        }
    }
}
