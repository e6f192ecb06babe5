//! Concurrent ledger store with per-key exclusive access

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use txgate_core::LedgerKey;

use crate::window::AccountWindow;

/// Concurrent map from ledger key to its transaction window.
///
/// `with_key` gives the caller exclusive access to one key's window for the
/// lifetime of the closure: two evaluations for the same key can never prune
/// or append concurrently, while evaluations for different keys proceed in
/// parallel (subject only to shard granularity). Windows are created lazily
/// on first access and live for the process lifetime unless `sweep` is used.
#[derive(Debug, Default)]
pub struct LedgerStore {
    ledgers: DashMap<LedgerKey, AccountWindow>,
}

impl LedgerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to the window for `key`, creating an
    /// empty window if the key is new.
    ///
    /// The key's shard lock is held for the duration of `f`; callers must
    /// not perform I/O or take other store locks inside the closure.
    pub fn with_key<R>(&self, key: LedgerKey, f: impl FnOnce(&mut AccountWindow) -> R) -> R {
        let mut ledger = self.ledgers.entry(key).or_default();
        f(ledger.value_mut())
    }

    /// Number of entries currently retained for `key` (0 if unknown)
    pub fn window_len(&self, key: LedgerKey) -> usize {
        self.ledgers.get(&key).map(|w| w.len()).unwrap_or(0)
    }

    /// Check whether a window exists for `key`
    pub fn contains_key(&self, key: LedgerKey) -> bool {
        self.ledgers.contains_key(&key)
    }

    /// Number of tracked keys
    pub fn key_count(&self) -> usize {
        self.ledgers.len()
    }

    /// Prune every window against `cutoff` and remove keys whose window
    /// became empty. Returns the number of removed keys.
    ///
    /// Not part of the evaluation path: idle-key growth is accepted by
    /// default and this reaper only runs when the host opts in.
    pub fn sweep(&self, cutoff: DateTime<Utc>) -> usize {
        let before = self.ledgers.len();
        self.ledgers.retain(|_, window| {
            window.remove_older_than(cutoff);
            !window.is_empty()
        });
        let removed = before - self.ledgers.len();
        if removed > 0 {
            tracing::debug!(removed, "swept idle ledgers");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use txgate_core::LedgerEntry;

    fn key(client_id: i64, account_id: i64) -> LedgerKey {
        LedgerKey {
            client_id,
            account_id,
        }
    }

    fn entry(transaction_id: i64, timestamp: DateTime<Utc>) -> LedgerEntry {
        LedgerEntry {
            transaction_id,
            timestamp,
            amount: dec!(10),
        }
    }

    #[test]
    fn test_window_created_lazily() {
        let store = LedgerStore::new();
        assert!(!store.contains_key(key(1, 100)));

        store.with_key(key(1, 100), |w| w.append(entry(1, Utc::now())));

        assert!(store.contains_key(key(1, 100)));
        assert_eq!(store.window_len(key(1, 100)), 1);
    }

    #[test]
    fn test_keys_are_isolated() {
        let store = LedgerStore::new();
        let now = Utc::now();

        store.with_key(key(1, 100), |w| w.append(entry(1, now)));
        store.with_key(key(2, 200), |w| w.append(entry(2, now)));

        assert_eq!(store.window_len(key(1, 100)), 1);
        assert_eq!(store.window_len(key(2, 200)), 1);
        assert_eq!(store.key_count(), 2);
    }

    #[test]
    fn test_same_key_mutations_are_serialized() {
        let store = Arc::new(LedgerStore::new());
        let now = Utc::now();
        let mut handles = Vec::new();

        // Concurrent appends to one key: with exclusive per-key access no
        // append may be lost.
        for i in 0..8i64 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                for j in 0..100i64 {
                    store.with_key(key(1, 100), |w| w.append(entry(i * 100 + j, now)));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.window_len(key(1, 100)), 800);
    }

    #[test]
    fn test_sweep_removes_emptied_windows_only() {
        let store = LedgerStore::new();
        let now = Utc::now();

        store.with_key(key(1, 100), |w| w.append(entry(1, now - Duration::seconds(120))));
        store.with_key(key(2, 200), |w| {
            w.append(entry(2, now - Duration::seconds(120)));
            w.append(entry(3, now));
        });

        let removed = store.sweep(now - Duration::milliseconds(60_000));

        assert_eq!(removed, 1);
        assert!(!store.contains_key(key(1, 100)));
        // Live key survives, stale entry pruned
        assert_eq!(store.window_len(key(2, 200)), 1);
    }

    #[test]
    fn test_sweep_on_empty_store() {
        let store = LedgerStore::new();
        assert_eq!(store.sweep(Utc::now()), 0);
    }
}
