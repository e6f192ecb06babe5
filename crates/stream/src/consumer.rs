//! Consuming loop: decode, hand off, acknowledge
//!
//! Delivery discipline, per record and in batch order:
//! - decode failure: log, count, acknowledge, drop (at-most-once loss for
//!   unparseable input, never escalated)
//! - handler failure: bounded retries with fixed backoff, non-retryable
//!   errors skip immediately; the record is still acknowledged
//! - acknowledgment always happens after the handler has fully produced and
//!   handed off the record's decisions

use async_trait::async_trait;
use std::time::Duration;
use txgate_core::TransactionEvent;

use crate::codec;
use crate::error::StreamError;
use crate::transport::RecordSource;

/// Processes one decoded event: evaluate and hand decisions downstream
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &TransactionEvent) -> Result<(), StreamError>;
}

#[async_trait]
impl<H: EventHandler> EventHandler for std::sync::Arc<H> {
    async fn handle(&self, event: &TransactionEvent) -> Result<(), StreamError> {
        (**self).handle(event).await
    }
}

/// Retry settings for transient handler failures
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(1000),
        }
    }
}

/// Counters accumulated over one consumer run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    /// Records decoded and handled successfully
    pub processed: u64,
    /// Records dropped because they failed decoding
    pub skipped_malformed: u64,
    /// Records dropped after handler retries were exhausted
    pub skipped_failed: u64,
}

/// The consuming loop over a record source
pub struct ConsumerLoop<S, H> {
    source: S,
    handler: H,
    policy: RetryPolicy,
}

impl<S: RecordSource, H: EventHandler> ConsumerLoop<S, H> {
    pub fn new(source: S, handler: H, policy: RetryPolicy) -> Self {
        Self {
            source,
            handler,
            policy,
        }
    }

    /// Consume until the source ends. A single bad record never stops the
    /// loop; only source failures do.
    pub async fn run(mut self) -> Result<ConsumerStats, StreamError> {
        let mut stats = ConsumerStats::default();

        while let Some(batch) = self.source.next_batch().await? {
            for payload in batch {
                match codec::decode_event(&payload) {
                    Ok(event) => match self.handle_with_retry(&event).await {
                        Ok(()) => stats.processed += 1,
                        Err(err) => {
                            tracing::error!(
                                %err,
                                transaction_id = event.transaction_id,
                                "handler failed, skipping record"
                            );
                            stats.skipped_failed += 1;
                        }
                    },
                    Err(err) => {
                        tracing::error!(%err, "dropping malformed record");
                        stats.skipped_malformed += 1;
                    }
                }
                // Decisions (if any) are handed off by now; safe to confirm
                // consumption.
                self.source.ack().await?;
            }
        }

        tracing::info!(
            processed = stats.processed,
            skipped_malformed = stats.skipped_malformed,
            skipped_failed = stats.skipped_failed,
            "record source ended"
        );
        Ok(stats)
    }

    async fn handle_with_retry(&self, event: &TransactionEvent) -> Result<(), StreamError> {
        let mut attempt = 1;
        loop {
            match self.handler.handle(event).await {
                Ok(()) => return Ok(()),
                Err(err) if !err.is_retryable() || attempt >= self.policy.max_attempts => {
                    return Err(err);
                }
                Err(err) => {
                    tracing::warn!(
                        %err,
                        attempt,
                        transaction_id = event.transaction_id,
                        "handler failed, retrying"
                    );
                    tokio::time::sleep(self.policy.backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    use crate::transport::ChannelSource;

    #[derive(Default)]
    struct RecordingHandler {
        seen: Mutex<Vec<i64>>,
        fail_first: AtomicU32,
        retryable: bool,
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        async fn handle(&self, event: &TransactionEvent) -> Result<(), StreamError> {
            if self.fail_first.load(Ordering::SeqCst) > 0 {
                self.fail_first.fetch_sub(1, Ordering::SeqCst);
                return if self.retryable {
                    Err(StreamError::Io(std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        "transient",
                    )))
                } else {
                    Err(StreamError::SinkClosed)
                };
            }
            self.seen.lock().unwrap().push(event.transaction_id);
            Ok(())
        }
    }

    fn event_payload(transaction_id: i64) -> String {
        format!(
            r#"{{"client_id":1,"account_id":100,"transaction_id":{transaction_id},"timestamp":"2024-03-01T10:15:30Z","transaction_amount":10.0,"account_balance":100.0}}"#
        )
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn test_records_handled_in_batch_order() {
        let (tx, rx) = mpsc::channel(16);
        for transaction_id in [3, 1, 2] {
            tx.send(event_payload(transaction_id)).await.unwrap();
        }
        drop(tx);

        let handler = std::sync::Arc::new(RecordingHandler::default());
        let consumer = ConsumerLoop::new(
            ChannelSource::new(rx, 4),
            std::sync::Arc::clone(&handler),
            fast_policy(),
        );
        let stats = consumer.run().await.unwrap();

        assert_eq!(stats.processed, 3);
        assert_eq!(*handler.seen.lock().unwrap(), vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn test_malformed_record_skipped_and_acked() {
        let (tx, rx) = mpsc::channel(16);
        tx.send(event_payload(1)).await.unwrap();
        tx.send("{ this is not json".to_string()).await.unwrap();
        tx.send(event_payload(2)).await.unwrap();
        drop(tx);

        let source = ChannelSource::new(rx, 4);
        let acks = source.ack_counter();
        let consumer = ConsumerLoop::new(source, RecordingHandler::default(), fast_policy());
        let stats = consumer.run().await.unwrap();

        assert_eq!(stats.processed, 2);
        assert_eq!(stats.skipped_malformed, 1);
        // The malformed record is acknowledged too
        assert_eq!(acks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_handler_failure_retried() {
        let (tx, rx) = mpsc::channel(16);
        tx.send(event_payload(1)).await.unwrap();
        drop(tx);

        let handler = RecordingHandler {
            fail_first: AtomicU32::new(2),
            retryable: true,
            ..Default::default()
        };
        let consumer = ConsumerLoop::new(ChannelSource::new(rx, 4), handler, fast_policy());
        let stats = consumer.run().await.unwrap();

        // Two transient failures, third attempt succeeds
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.skipped_failed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_bounded_then_record_skipped() {
        let (tx, rx) = mpsc::channel(16);
        tx.send(event_payload(1)).await.unwrap();
        tx.send(event_payload(2)).await.unwrap();
        drop(tx);

        let handler = RecordingHandler {
            fail_first: AtomicU32::new(3),
            retryable: true,
            ..Default::default()
        };
        let source = ChannelSource::new(rx, 4);
        let acks = source.ack_counter();
        let consumer = ConsumerLoop::new(source, handler, fast_policy());
        let stats = consumer.run().await.unwrap();

        // First record exhausts its 3 attempts and is skipped; the loop
        // continues with the next record.
        assert_eq!(stats.skipped_failed, 1);
        assert_eq!(stats.processed, 1);
        assert_eq!(acks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_failure_skips_immediately() {
        let (tx, rx) = mpsc::channel(16);
        tx.send(event_payload(1)).await.unwrap();
        drop(tx);

        let handler = RecordingHandler {
            fail_first: AtomicU32::new(1),
            retryable: false,
            ..Default::default()
        };
        let consumer = ConsumerLoop::new(ChannelSource::new(rx, 4), handler, fast_policy());
        let stats = consumer.run().await.unwrap();

        assert_eq!(stats.skipped_failed, 1);
        assert_eq!(stats.processed, 0);
    }
}
