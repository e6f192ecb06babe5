//! Inbound transaction event and the ledger types derived from it

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A decoded inbound transaction event.
///
/// `transaction_id` is not guaranteed unique: the transport is at-least-once
/// and redeliveries are treated as new ledger input, never deduplicated.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionEvent {
    pub client_id: i64,
    pub account_id: i64,
    pub transaction_id: i64,
    /// Timestamp reported by the upstream producer, not the arrival time
    pub timestamp: DateTime<Utc>,
    pub amount: Decimal,
    /// Account balance as reported on the event itself.
    ///
    /// The admission check trusts this value as-is; no running balance is
    /// reconstructed from the ledger.
    pub balance: Decimal,
}

impl TransactionEvent {
    /// The ledger key this event is scoped to
    pub fn key(&self) -> LedgerKey {
        LedgerKey {
            client_id: self.client_id,
            account_id: self.account_id,
        }
    }

    /// The subset of this event retained for window accounting
    pub fn entry(&self) -> LedgerEntry {
        LedgerEntry {
            transaction_id: self.transaction_id,
            timestamp: self.timestamp,
            amount: self.amount,
        }
    }
}

/// Identity of one per-account ledger: admission state is scoped per
/// (client, account) pair, not per client globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LedgerKey {
    pub client_id: i64,
    pub account_id: i64,
}

impl std::fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.client_id, self.account_id)
    }
}

/// One retained window member
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerEntry {
    pub transaction_id: i64,
    pub timestamp: DateTime<Utc>,
    pub amount: Decimal,
}
