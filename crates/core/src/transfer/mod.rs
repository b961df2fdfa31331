//! Transfer validation, lock ordering, and balance planning.
//!
//! The db crate's transfer engine acquires locks and persists rows; every
//! decision it makes (input validation, lock order, status gating, balance
//! math) is computed here so it can be tested without a database.

pub mod error;
pub mod service;

pub use error::TransferError;
pub use service::{TransferCommand, TransferPlan, TransferService, lock_order};
