//! Stored-vs-calculated balance comparison.

pub mod service;

pub use service::{Discrepancy, ReconcileService, StoredBalance};
