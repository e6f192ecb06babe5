//! TxGate Service - Host process for the admission core
//!
//! Wires a record source through the admission controller to a decision
//! publisher, with configuration loaded from a JSON file.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use pipeline::{run, AdmissionHandler};
