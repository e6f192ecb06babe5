//! Boundary traits for the inbound and outbound streams, plus the
//! in-process channel transport used by tests and embedders

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::StreamError;

/// Inbound side of the transport.
///
/// Delivers raw payloads in small batches; the consumer acknowledges each
/// record individually, in batch order, only after its decisions have been
/// handed to the publisher. Acking earlier would risk silent decision loss
/// on crash.
#[async_trait]
pub trait RecordSource: Send {
    /// Next batch of raw payloads, or `None` when the stream ends
    async fn next_batch(&mut self) -> Result<Option<Vec<String>>, StreamError>;

    /// Confirm consumption of the oldest unacknowledged record
    async fn ack(&mut self) -> Result<(), StreamError>;
}

/// Outbound side of the transport.
///
/// `key` is a per-message routing key. Decisions are sent under a random
/// key, so the outbound stream gives no ordering guarantee across decisions
/// for the same account.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn send(&self, key: &str, payload: &str) -> Result<(), StreamError>;
}

/// One outbound message as handed to a channel sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub key: String,
    pub payload: String,
}

/// In-process source backed by a tokio mpsc channel
pub struct ChannelSource {
    rx: mpsc::Receiver<String>,
    batch_size: usize,
    acked: Arc<AtomicU64>,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<String>, batch_size: usize) -> Self {
        Self {
            rx,
            batch_size: batch_size.max(1),
            acked: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Counter of acknowledged records, readable after the source has been
    /// handed to a consumer loop
    pub fn ack_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.acked)
    }
}

#[async_trait]
impl RecordSource for ChannelSource {
    async fn next_batch(&mut self) -> Result<Option<Vec<String>>, StreamError> {
        // Block for the first record, then drain whatever else is already
        // queued up to the batch size.
        let first = match self.rx.recv().await {
            Some(payload) => payload,
            None => return Ok(None),
        };

        let mut batch = vec![first];
        while batch.len() < self.batch_size {
            match self.rx.try_recv() {
                Ok(payload) => batch.push(payload),
                Err(_) => break,
            }
        }
        Ok(Some(batch))
    }

    async fn ack(&mut self) -> Result<(), StreamError> {
        self.acked.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// In-process sink backed by a tokio mpsc channel
#[derive(Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<OutboundMessage>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<OutboundMessage>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl RecordSink for ChannelSink {
    async fn send(&self, key: &str, payload: &str) -> Result<(), StreamError> {
        self.tx
            .send(OutboundMessage {
                key: key.to_string(),
                payload: payload.to_string(),
            })
            .await
            .map_err(|_| StreamError::SinkClosed)
    }
}
