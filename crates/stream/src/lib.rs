//! TxGate Stream - Transport boundary for the admission core
//!
//! The event-stream transport itself (brokers, partitions, offsets) is an
//! external collaborator. This crate owns what the core needs from it:
//! - the wire codec for inbound transaction records and outbound decisions
//! - `RecordSource` / `RecordSink` boundary traits
//! - the consuming loop with its acknowledgment and retry discipline
//! - the retrying decision publisher
//!
//! Two transports are bundled: an in-process channel pair (tests, embedding)
//! and a JSON-lines reader/writer (stdin/stdout or file backed).

pub mod codec;
pub mod consumer;
pub mod error;
pub mod jsonl;
pub mod publisher;
pub mod transport;

pub use consumer::{ConsumerLoop, ConsumerStats, EventHandler, RetryPolicy};
pub use error::StreamError;
pub use publisher::{DecisionPublisher, RetryingPublisher};
pub use transport::{ChannelSink, ChannelSource, OutboundMessage, RecordSink, RecordSource};
