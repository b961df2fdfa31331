//! Repositories and engines orchestrating atomic ledger units.
//!
//! Repositories hide the `SeaORM` details; the engines (transfer, deposit,
//! revert) own the atomic units and are the only writers of ledger state.

pub mod account;
pub mod cache;
pub mod deposit;
pub mod error;
pub mod idempotency;
pub mod outbox;
pub mod reconciliation;
pub mod revert;
pub mod transfer;

pub use account::{AccountRepository, OpenedAccount, StatementLine};
pub use cache::ReadCache;
pub use deposit::DepositEngine;
pub use error::LedgerError;
pub use idempotency::{IdempotencyCache, IdempotencyRepository, StoredResponse};
pub use outbox::OutboxRepository;
pub use reconciliation::{ReconciliationJob, ReconciliationSummary};
pub use revert::RevertEngine;
pub use transfer::TransferEngine;
