//! Stream boundary errors

use thiserror::Error;

/// Errors that can occur at the stream boundary
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("failed to decode inbound record: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode outbound record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("record source closed")]
    SourceClosed,

    #[error("record sink closed")]
    SinkClosed,

    #[error("publish retries exhausted after {attempts} attempts")]
    PublishExhausted { attempts: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StreamError {
    /// Whether the consumer loop may retry the operation that produced this
    /// error. Malformed payloads and closed endpoints never heal on retry;
    /// exhausted publishes have already been retried by the publisher.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StreamError::Io(_))
    }
}
