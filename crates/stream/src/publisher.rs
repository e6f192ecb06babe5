//! Decision publisher with bounded retry
//!
//! Publishing happens after the ledger key scope is released, so a slow
//! outbound stream never blocks same-key throughput. Exhausted retries log
//! the drop and surface an error; the caller chooses whether to escalate.

use async_trait::async_trait;
use std::time::Duration;
use txgate_core::Decision;
use uuid::Uuid;

use crate::codec;
use crate::error::StreamError;
use crate::transport::RecordSink;

/// Outbound hand-off for one decision
#[async_trait]
pub trait DecisionPublisher: Send + Sync {
    async fn publish(&self, decision: &Decision) -> Result<(), StreamError>;
}

/// Publisher that serializes each decision and sends it under a random
/// UUID message key, retrying a bounded number of times with fixed backoff.
pub struct RetryingPublisher<S> {
    sink: S,
    max_retries: u32,
    backoff: Duration,
}

impl<S: RecordSink> RetryingPublisher<S> {
    pub fn new(sink: S, max_retries: u32, backoff: Duration) -> Self {
        Self {
            sink,
            max_retries,
            backoff,
        }
    }
}

#[async_trait]
impl<S: RecordSink> DecisionPublisher for RetryingPublisher<S> {
    async fn publish(&self, decision: &Decision) -> Result<(), StreamError> {
        let payload = codec::encode_decision(decision)?;
        let key = Uuid::new_v4().to_string();

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.sink.send(&key, &payload).await {
                Ok(()) => {
                    tracing::debug!(
                        transaction_id = decision.transaction_id,
                        account_id = decision.account_id,
                        status = ?decision.status,
                        "decision published"
                    );
                    return Ok(());
                }
                Err(err) if attempts > self.max_retries => {
                    tracing::error!(
                        %err,
                        attempts,
                        transaction_id = decision.transaction_id,
                        "publish retries exhausted, dropping decision"
                    );
                    return Err(StreamError::PublishExhausted { attempts });
                }
                Err(err) => {
                    tracing::warn!(%err, attempts, "publish failed, retrying");
                    tokio::time::sleep(self.backoff).await;
                }
            }
        }
    }
}
