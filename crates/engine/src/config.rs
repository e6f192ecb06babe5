//! Admission thresholds, configurable without recompilation

use serde::{Deserialize, Serialize};

/// Configuration for the admission controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Trailing window duration in milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Maximum transaction count tolerated inside the window; one more
    /// triggers a window-wide block
    #[serde(default = "default_max_transactions")]
    pub max_transactions: usize,
}

fn default_window_ms() -> u64 {
    60_000
}

fn default_max_transactions() -> usize {
    3
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            max_transactions: default_max_transactions(),
        }
    }
}

impl AdmissionConfig {
    /// Get the window as a chrono Duration, saturating for values beyond
    /// the millisecond range of i64
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(i64::try_from(self.window_ms).unwrap_or(i64::MAX))
    }
}
