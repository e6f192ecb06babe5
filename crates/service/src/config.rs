//! Service configuration, loaded from a JSON file with per-field defaults

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use txgate_engine::AdmissionConfig;

use crate::error::ServiceError;

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Admission thresholds (window duration, max count)
    #[serde(default)]
    pub admission: AdmissionConfig,

    /// Consumer retry behavior for transient handling failures
    #[serde(default)]
    pub consumer: ConsumerSettings,

    /// Publisher retry behavior for outbound sends
    #[serde(default)]
    pub publisher: PublisherSettings,

    /// Interval for the idle-ledger reaper; absent means the reaper is off
    /// and ledgers for silent keys are kept for the process lifetime
    #[serde(default)]
    pub reaper_interval_ms: Option<u64>,

    /// Inbound channel name (log context; binding is the transport's job)
    #[serde(default = "default_inbound_topic")]
    pub inbound_topic: String,

    /// Outbound channel name
    #[serde(default = "default_outbound_topic")]
    pub outbound_topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerSettings {
    /// Total handling attempts per record, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts, in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Records pulled per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherSettings {
    /// Retries after the first failed send
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between sends, in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    1000
}

fn default_batch_size() -> usize {
    16
}

fn default_inbound_topic() -> String {
    "transaction_accept".to_string()
}

fn default_outbound_topic() -> String {
    "transaction_result".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            admission: AdmissionConfig::default(),
            consumer: ConsumerSettings::default(),
            publisher: PublisherSettings::default(),
            reaper_interval_ms: None,
            inbound_topic: default_inbound_topic(),
            outbound_topic: default_outbound_topic(),
        }
    }
}

impl Default for ConsumerSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
            batch_size: default_batch_size(),
        }
    }
}

impl Default for PublisherSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl ConsumerSettings {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl PublisherSettings {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl ServiceConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ServiceError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn reaper_interval(&self) -> Option<Duration> {
        self.reaper_interval_ms.map(Duration::from_millis)
    }
}
