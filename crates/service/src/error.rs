//! Service errors

use thiserror::Error;

/// Errors from service startup and the consuming pipeline
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to read config file: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("stream failure: {0}")]
    Stream(#[from] txgate_stream::StreamError),
}
