//! Error types for all ciberchat crates.

use std::time::Duration;

/// Errors that end a stream before it completes normally.
///
/// Malformed frames are not errors: they are logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Reading the response body failed.
    #[error("stream read error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The body ended without the `[DONE]` sentinel and strict termination
    /// is enabled.
    #[error("stream ended without [DONE] sentinel")]
    Truncated,
}

/// Errors from the chat HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    // Retryable errors
    /// Network-level error (connection reset, DNS failure, etc.).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Request timed out.
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    /// Server-side failure (5xx).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    // Terminal errors
    /// Session missing or rejected (401/403).
    #[error("not authenticated: {0}")]
    Authentication(String),
    /// Rejected request (400) or a request refused before sending.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Chat or message not found (404).
    #[error("not found: {0}")]
    NotFound(String),
    /// Any other non-success status.
    #[error("unexpected HTTP status {status}: {detail}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Server `detail` message or raw body.
        detail: String,
    },
    /// The response body was not the expected JSON.
    #[error("invalid response body: {0}")]
    Decode(String),
    /// The event stream ended abnormally.
    #[error(transparent)]
    Stream(#[from] StreamError),
}

impl ClientError {
    /// Whether this error is likely transient and the request can be retried.
    ///
    /// Nothing in this workspace retries; the decision belongs to the caller.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_)
                | Self::Timeout(_)
                | Self::ServiceUnavailable(_)
                | Self::Stream(StreamError::Transport(_))
        )
    }
}
