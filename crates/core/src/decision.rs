//! Admission decisions published for each evaluated transaction

use serde::{Deserialize, Serialize};

/// Outcome of the admission check for a single transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Within limits and covered by the reported balance
    Accepted,
    /// Reported balance does not cover the amount
    Rejected,
    /// Window transaction count exceeded; applies to the whole window
    Blocked,
}

/// The published decision record.
///
/// Serializes directly to the outbound wire shape:
/// `{"transaction_id": .., "account_id": .., "status": "ACCEPTED"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub transaction_id: i64,
    pub account_id: i64,
    pub status: TransactionStatus,
}

impl Decision {
    pub fn accepted(transaction_id: i64, account_id: i64) -> Self {
        Self {
            transaction_id,
            account_id,
            status: TransactionStatus::Accepted,
        }
    }

    pub fn rejected(transaction_id: i64, account_id: i64) -> Self {
        Self {
            transaction_id,
            account_id,
            status: TransactionStatus::Rejected,
        }
    }

    pub fn blocked(transaction_id: i64, account_id: i64) -> Self {
        Self {
            transaction_id,
            account_id,
            status: TransactionStatus::Blocked,
        }
    }

    /// Check if the transaction was accepted
    pub fn is_accepted(&self) -> bool {
        self.status == TransactionStatus::Accepted
    }

    /// Check if the transaction was rejected
    pub fn is_rejected(&self) -> bool {
        self.status == TransactionStatus::Rejected
    }

    /// Check if the transaction was blocked
    pub fn is_blocked(&self) -> bool {
        self.status == TransactionStatus::Blocked
    }
}
