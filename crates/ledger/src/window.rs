//! Time-ordered window of recent transaction entries for one account

use chrono::{DateTime, Utc};
use txgate_core::LedgerEntry;

/// Sliding window for a single (client, account) key.
///
/// Entries are appended in arrival order and never reordered. Expired
/// entries are removed only by `remove_older_than` on a later evaluation for
/// the same key; there is no background expiry inside the window itself.
#[derive(Debug, Default, Clone)]
pub struct AccountWindow {
    entries: Vec<LedgerEntry>,
}

impl AccountWindow {
    /// Create an empty window
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every entry with `timestamp < cutoff`.
    ///
    /// The boundary is inclusive: an entry exactly `cutoff` old is retained,
    /// so a window of W keeps entries with age <= W.
    pub fn remove_older_than(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.timestamp >= cutoff);
        before - self.entries.len()
    }

    /// Append an entry at the end of the window
    pub fn append(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    /// Number of entries currently in the window
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries currently in the window, in arrival order
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Owned copy of the current window members, for decision emission
    /// after the key scope is released
    pub fn snapshot(&self) -> Vec<LedgerEntry> {
        self.entries.clone()
    }
}
