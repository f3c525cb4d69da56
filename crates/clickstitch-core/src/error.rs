// Error types for the event write path

use std::time::Duration;
use thiserror::Error;

/// Result type alias for write-path operations
pub type Result<T> = std::result::Result<T, WriteError>;

/// Errors that can occur while handling an inbound event
#[derive(Debug, Error)]
pub enum WriteError {
    /// Origin token/URL failed verification; no session work is performed
    #[error("origin validation rejected: {0}")]
    ValidationRejected(String),

    /// History store query failed
    #[error("history store unavailable: {0}")]
    HistoryUnavailable(String),

    /// History store query exceeded its bound
    #[error("history store query timed out after {0:?}")]
    HistoryTimeout(Duration),

    /// A retrieved history record could not be interpreted.
    /// Policy: this fails the call rather than defaulting to a new session.
    #[error("malformed history record: {0}")]
    MalformedRecord(String),

    /// Downstream forwarder rejected or timed out on publish
    #[error("publish failed: {0}")]
    Publish(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl WriteError {
    /// Create a validation rejection
    pub fn rejected(msg: impl Into<String>) -> Self {
        WriteError::ValidationRejected(msg.into())
    }

    /// Create a history store error
    pub fn history(msg: impl Into<String>) -> Self {
        WriteError::HistoryUnavailable(msg.into())
    }

    /// Create a malformed-record error
    pub fn malformed(msg: impl Into<String>) -> Self {
        WriteError::MalformedRecord(msg.into())
    }

    /// Create a publish error
    pub fn publish(msg: impl Into<String>) -> Self {
        WriteError::Publish(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        WriteError::Configuration(msg.into())
    }

    /// Whether the caller may retry the whole request as-is
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WriteError::HistoryUnavailable(_) | WriteError::HistoryTimeout(_)
        )
    }
}
