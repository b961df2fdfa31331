//! Error types for transaction reversal.

use thiserror::Error;
use uuid::Uuid;

use crate::ledger::TransactionStatus;

/// Business-rule failures of the reversal path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReversalError {
    /// The transaction was already reverted once. Reversals never chain.
    #[error("Transaction {0} has already been reverted")]
    AlreadyReverted(Uuid),

    /// Only completed transactions can be reverted.
    #[error("Transaction {transaction_id} is {status} and cannot be reverted")]
    InvalidState {
        /// The target transaction.
        transaction_id: Uuid,
        /// Its current status.
        status: TransactionStatus,
    },

    /// The stored ledger legs do not form a debit/credit pair, so the
    /// original flow direction cannot be recovered.
    #[error("Transaction {0} does not have a matching debit/credit entry pair")]
    MalformedEntries(Uuid),
}
