//! TxGate Admission Engine
//!
//! Decides ACCEPTED / REJECTED / BLOCKED for each incoming transaction from
//! the account's recent activity window and the event-carried balance.

pub mod config;
pub mod controller;

pub use config::AdmissionConfig;
pub use controller::AdmissionController;
