//! TxGate Core - Domain types
//!
//! This crate contains the fundamental types used across TxGate:
//! - `TransactionEvent`: one decoded inbound transaction
//! - `LedgerKey` / `LedgerEntry`: the per-account window identity and members
//! - `Decision` / `TransactionStatus`: the published admission outcome

pub mod decision;
pub mod event;

pub use decision::{Decision, TransactionStatus};
pub use event::{LedgerEntry, LedgerKey, TransactionEvent};
