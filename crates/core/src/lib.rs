//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations live
//! here; the db crate wires them into atomic units.
//!
//! # Modules
//!
//! - `ledger` - Domain types for accounts, transactions, and entry legs
//! - `transfer` - Transfer validation, lock ordering, and balance planning
//! - `reversal` - Inverse-transfer composition for reverting transactions
//! - `outbox` - Downstream event payloads
//! - `reconcile` - Stored-vs-calculated balance comparison

pub mod ledger;
pub mod outbox;
pub mod reconcile;
pub mod reversal;
pub mod transfer;
