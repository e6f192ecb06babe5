//! Admission controller - per-event evaluation against the account window

use chrono::{DateTime, Utc};
use txgate_core::{Decision, LedgerEntry, TransactionEvent};
use txgate_ledger::LedgerStore;

use crate::config::AdmissionConfig;

/// Outcome of the window mutation, captured while the key scope is held
enum WindowOutcome {
    /// Count within limits; decide on the new entry alone
    WithinLimit,
    /// Count exceeded the maximum; every current window member is blocked
    Exceeded(Vec<LedgerEntry>),
}

/// Decides the admission status of each incoming transaction.
///
/// Evaluation is one logically atomic step per key: prune expired entries,
/// append the new one, then apply the decision rules. Decisions are built
/// after the key scope is released so that publishing never blocks other
/// arrivals for the same account.
pub struct AdmissionController {
    config: AdmissionConfig,
    store: LedgerStore,
}

impl AdmissionController {
    /// Create a controller with an empty ledger store
    pub fn new(config: AdmissionConfig) -> Self {
        Self {
            config,
            store: LedgerStore::new(),
        }
    }

    pub fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Evaluate an event against the current wall clock
    pub fn evaluate(&self, event: &TransactionEvent) -> Vec<Decision> {
        self.evaluate_at(event, Utc::now())
    }

    /// Evaluate an event at an explicit point in time.
    ///
    /// Always returns at least one decision. When the post-append count
    /// exceeds the configured maximum, one BLOCKED decision is emitted for
    /// every entry currently in the window - including entries already
    /// accepted by earlier calls. The re-notification is intentional: the
    /// block applies to the whole window, not just the triggering
    /// transaction.
    pub fn evaluate_at(&self, event: &TransactionEvent, now: DateTime<Utc>) -> Vec<Decision> {
        let key = event.key();
        let cutoff = now - self.config.window();
        let max = self.config.max_transactions;

        let outcome = self.store.with_key(key, |window| {
            window.remove_older_than(cutoff);
            window.append(event.entry());
            if window.len() > max {
                WindowOutcome::Exceeded(window.snapshot())
            } else {
                WindowOutcome::WithinLimit
            }
        });

        match outcome {
            WindowOutcome::Exceeded(entries) => {
                tracing::warn!(
                    %key,
                    count = entries.len(),
                    max,
                    "window limit exceeded, blocking all transactions in window"
                );
                entries
                    .iter()
                    .map(|entry| Decision::blocked(entry.transaction_id, event.account_id))
                    .collect()
            }
            WindowOutcome::WithinLimit if event.balance < event.amount => {
                tracing::debug!(
                    %key,
                    transaction_id = event.transaction_id,
                    "reported balance below amount, rejecting"
                );
                vec![Decision::rejected(event.transaction_id, event.account_id)]
            }
            WindowOutcome::WithinLimit => {
                tracing::debug!(%key, transaction_id = event.transaction_id, "accepted");
                vec![Decision::accepted(event.transaction_id, event.account_id)]
            }
        }
    }
}
