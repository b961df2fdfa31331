//! Postgres enum mappings.
//!
//! These mirror the pure domain enums in `tally-core`; conversions keep the
//! engines working in domain terms while `SeaORM` speaks the database types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `account_status` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_status")]
pub enum AccountStatus {
    /// Account can send and receive money.
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// Account is temporarily blocked.
    #[sea_orm(string_value = "FROZEN")]
    Frozen,
    /// Account is permanently closed.
    #[sea_orm(string_value = "CLOSED")]
    Closed,
}

/// `transaction_status` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_status")]
pub enum TransactionStatus {
    /// Initiated but not yet booked.
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Booked with both ledger legs.
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    /// Undone by a later inverse transaction.
    #[sea_orm(string_value = "REVERTED")]
    Reverted,
}

/// `operation_type` Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "operation_type")]
pub enum OperationType {
    /// Money leaves the account.
    #[sea_orm(string_value = "DEBIT")]
    Debit,
    /// Money enters the account.
    #[sea_orm(string_value = "CREDIT")]
    Credit,
}

impl From<AccountStatus> for tally_core::ledger::AccountStatus {
    fn from(value: AccountStatus) -> Self {
        match value {
            AccountStatus::Active => Self::Active,
            AccountStatus::Frozen => Self::Frozen,
            AccountStatus::Closed => Self::Closed,
        }
    }
}

impl From<tally_core::ledger::AccountStatus> for AccountStatus {
    fn from(value: tally_core::ledger::AccountStatus) -> Self {
        match value {
            tally_core::ledger::AccountStatus::Active => Self::Active,
            tally_core::ledger::AccountStatus::Frozen => Self::Frozen,
            tally_core::ledger::AccountStatus::Closed => Self::Closed,
        }
    }
}

impl From<TransactionStatus> for tally_core::ledger::TransactionStatus {
    fn from(value: TransactionStatus) -> Self {
        match value {
            TransactionStatus::Pending => Self::Pending,
            TransactionStatus::Completed => Self::Completed,
            TransactionStatus::Reverted => Self::Reverted,
        }
    }
}

impl From<tally_core::ledger::TransactionStatus> for TransactionStatus {
    fn from(value: tally_core::ledger::TransactionStatus) -> Self {
        match value {
            tally_core::ledger::TransactionStatus::Pending => Self::Pending,
            tally_core::ledger::TransactionStatus::Completed => Self::Completed,
            tally_core::ledger::TransactionStatus::Reverted => Self::Reverted,
        }
    }
}

impl From<OperationType> for tally_core::ledger::OperationType {
    fn from(value: OperationType) -> Self {
        match value {
            OperationType::Debit => Self::Debit,
            OperationType::Credit => Self::Credit,
        }
    }
}

impl From<tally_core::ledger::OperationType> for OperationType {
    fn from(value: tally_core::ledger::OperationType) -> Self {
        match value {
            tally_core::ledger::OperationType::Debit => Self::Debit,
            tally_core::ledger::OperationType::Credit => Self::Credit,
        }
    }
}
