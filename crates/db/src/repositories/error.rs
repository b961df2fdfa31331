//! Error type shared by the ledger engines.

use sea_orm::DbErr;
use tally_core::reversal::ReversalError;
use tally_core::transfer::TransferError;
use tally_shared::AppError;
use uuid::Uuid;

/// Failures of the engines and repositories in this crate.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Input rejected before any I/O.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// A concurrent request already claimed this idempotency key; the
    /// claimant's unit committed (or is committing) first. A retry replays
    /// the claimant's result through the durable lookup.
    #[error("Idempotency key already claimed: {0}")]
    DuplicateKey(String),

    /// Transfer rejected by a business rule.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Reversal rejected by a business rule.
    #[error(transparent)]
    Reversal(#[from] ReversalError),

    /// Outbox payload could not be encoded. Fatal to the atomic unit: a
    /// transfer is never booked without its event.
    #[error("Failed to encode outbox event: {0}")]
    OutboxEncoding(#[from] serde_json::Error),

    /// Row-lock acquisition timed out. Retryable.
    #[error("Timed out waiting for account locks")]
    LockTimeout,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(msg) => Self::Validation(msg),
            LedgerError::AccountNotFound(id) => Self::NotFound(format!("account {id}")),
            LedgerError::TransactionNotFound(id) => Self::NotFound(format!("transaction {id}")),
            LedgerError::DuplicateKey(key) => {
                Self::Conflict(format!("idempotency key {key} already claimed"))
            }
            LedgerError::Transfer(inner) => match inner {
                TransferError::NonPositiveAmount(_) | TransferError::SelfTransfer(_) => {
                    Self::Validation(inner.to_string())
                }
                TransferError::NotTransactable { .. } => {
                    Self::AccountNotTransactable(inner.to_string())
                }
                TransferError::InsufficientFunds { .. } => {
                    Self::InsufficientFunds(inner.to_string())
                }
            },
            LedgerError::Reversal(inner) => match inner {
                ReversalError::AlreadyReverted(_) => Self::AlreadyReverted(inner.to_string()),
                ReversalError::InvalidState { .. } => {
                    Self::InvalidReversalState(inner.to_string())
                }
                ReversalError::MalformedEntries(_) => Self::Internal(inner.to_string()),
            },
            LedgerError::OutboxEncoding(inner) => Self::Internal(inner.to_string()),
            LedgerError::LockTimeout => {
                Self::LockTimeout("account locks not acquired in time".to_string())
            }
            LedgerError::Database(inner) => Self::Database(inner.to_string()),
        }
    }
}

/// Maps a `DbErr` raised while holding or acquiring row locks.
///
/// `SET LOCAL lock_timeout` makes Postgres abort the waiter with SQLSTATE
/// 55P03; `SeaORM` surfaces that as a query error whose text carries the
/// `lock timeout` marker.
#[must_use]
pub fn map_lock_error(err: DbErr) -> LedgerError {
    let text = err.to_string();
    if text.contains("lock timeout") || text.contains("55P03") {
        LedgerError::LockTimeout
    } else {
        LedgerError::Database(err)
    }
}

/// True when a `DbErr` carries a Postgres unique violation (SQLSTATE 23505).
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    let text = err.to_string();
    text.contains("duplicate key") || text.contains("23505")
}
