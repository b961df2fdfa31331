//! Shared domain types for accounts, transactions, and ledger entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Account can send and receive money.
    Active,
    /// Account is temporarily blocked from transacting.
    Frozen,
    /// Account is permanently closed.
    Closed,
}

impl AccountStatus {
    /// Whether the account may participate in transfers and deposits.
    #[must_use]
    pub const fn can_transact(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Frozen => write!(f, "FROZEN"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

/// Lifecycle status of a logical money movement.
///
/// The engines are synchronous, so `Pending` is only a transient initial
/// value; a transaction is persisted `Completed` in the same atomic unit
/// that writes its ledger entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Movement has been initiated but not yet booked.
    Pending,
    /// Movement is booked: both ledger legs exist.
    Completed,
    /// Movement was undone by a later inverse transaction.
    Reverted,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Reverted => write!(f, "REVERTED"),
        }
    }
}

/// Direction of a ledger entry leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    /// Money leaves the account.
    Debit,
    /// Money enters the account.
    Credit,
}

impl OperationType {
    /// Signed contribution of an entry with this operation to an account
    /// balance: credits add, debits subtract.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Credit => amount,
            Self::Debit => -amount,
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debit => write!(f, "DEBIT"),
            Self::Credit => write!(f, "CREDIT"),
        }
    }
}

/// The fields of an account a transfer decision depends on.
#[derive(Debug, Clone, Copy)]
pub struct AccountSnapshot {
    /// The account ID.
    pub id: Uuid,
    /// Current status.
    pub status: AccountStatus,
    /// Current stored balance.
    pub balance: Decimal,
}

/// One leg of a booked transaction, as read back from the ledger.
#[derive(Debug, Clone, Copy)]
pub struct EntryLeg {
    /// Account the leg applies to.
    pub account_id: Uuid,
    /// Debit or credit.
    pub operation: OperationType,
    /// Positive amount moved.
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_only_active_can_transact() {
        assert!(AccountStatus::Active.can_transact());
        assert!(!AccountStatus::Frozen.can_transact());
        assert!(!AccountStatus::Closed.can_transact());
    }

    #[test]
    fn test_signed_amounts() {
        assert_eq!(OperationType::Credit.signed(dec!(10.5)), dec!(10.5));
        assert_eq!(OperationType::Debit.signed(dec!(10.5)), dec!(-10.5));
    }

    #[test]
    fn test_status_display_matches_wire_format() {
        assert_eq!(AccountStatus::Active.to_string(), "ACTIVE");
        assert_eq!(TransactionStatus::Reverted.to_string(), "REVERTED");
        assert_eq!(OperationType::Debit.to_string(), "DEBIT");
        assert_eq!(OperationType::Credit.to_string(), "CREDIT");
    }
}
