//! TxGate Ledger Store - Per-account transaction windows
//!
//! Concurrent map from `LedgerKey` to a time-ordered window of recent
//! transaction entries. Access is exclusive per key for the duration of one
//! scoped closure; unrelated keys are never serialized against each other.

pub mod store;
pub mod window;

pub use store::LedgerStore;
pub use window::AccountWindow;
