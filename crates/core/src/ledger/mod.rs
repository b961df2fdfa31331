//! Domain types for the double-entry ledger.

pub mod types;

pub use types::{AccountSnapshot, AccountStatus, EntryLeg, OperationType, TransactionStatus};
