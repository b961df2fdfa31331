//! Error types for transfer planning.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::ledger::AccountStatus;

/// Business-rule failures of the transfer path.
///
/// All of these abort the in-flight atomic unit with nothing committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// Transfer amount must be strictly positive.
    #[error("Transfer amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Source and target accounts must differ.
    #[error("Cannot transfer from an account to itself: {0}")]
    SelfTransfer(Uuid),

    /// An account is frozen or closed.
    #[error("Account {account_id} is {status}")]
    NotTransactable {
        /// The offending account.
        account_id: Uuid,
        /// Its current status.
        status: AccountStatus,
    },

    /// Source balance does not cover the amount. No state is mutated.
    #[error("Insufficient funds in account {account_id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// The source account.
        account_id: Uuid,
        /// Its balance at decision time.
        balance: Decimal,
        /// The requested transfer amount.
        requested: Decimal,
    },
}
