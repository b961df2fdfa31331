//! Deposit engine: external cash-in onto a single account.
//!
//! Deposits are single-legged by design: money enters from outside the
//! system, so only a CREDIT entry is written. They carry no idempotency
//! key, emit no outbox event, and land regardless of account status; only
//! outgoing movement is gated on ACTIVE.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use uuid::Uuid;

use super::account::lock_account;
use super::cache::ReadCache;
use super::error::LedgerError;
use super::transfer::set_lock_timeout;
use crate::entities::{
    accounts, ledger_entries,
    sea_orm_active_enums::{OperationType, TransactionStatus},
    transactions,
};

/// Description recorded when the client supplies none.
const DEFAULT_DEPOSIT_DESCRIPTION: &str = "Cash-in";

/// Engine orchestrating deposit atomic units.
#[derive(Clone)]
pub struct DepositEngine {
    db: DatabaseConnection,
    read_cache: ReadCache,
    lock_timeout_ms: u64,
}

impl DepositEngine {
    /// Creates a new deposit engine.
    #[must_use]
    pub const fn new(db: DatabaseConnection, read_cache: ReadCache, lock_timeout_ms: u64) -> Self {
        Self {
            db,
            read_cache,
            lock_timeout_ms,
        }
    }

    /// Credits an account with external funds, returning the booked
    /// transaction id.
    ///
    /// # Errors
    ///
    /// `Validation` for a non-positive amount, `AccountNotFound`,
    /// retryable `LockTimeout`, or `Database`.
    pub async fn deposit(
        &self,
        account_id: Uuid,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<Uuid, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::Validation(format!(
                "Deposit amount must be positive, got {amount}"
            )));
        }

        let txn = self.db.begin().await?;
        set_lock_timeout(&txn, self.lock_timeout_ms).await?;

        // Not gated on status: incoming funds are accepted even on a
        // frozen or closed account.
        let account = lock_account(&txn, account_id).await?;

        let new_balance = account.balance + amount;
        let now = Utc::now();
        let transaction_id = Uuid::new_v4();

        let header = transactions::ActiveModel {
            id: Set(transaction_id),
            correlation_id: Set(Uuid::new_v4().to_string()),
            description: Set(description.unwrap_or_else(|| DEFAULT_DEPOSIT_DESCRIPTION.to_string())),
            status: Set(TransactionStatus::Completed),
            reverted_by_transaction_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        header.insert(&txn).await?;

        let mut active: accounts::ActiveModel = account.into();
        active.balance = Set(new_balance);
        active.updated_at = Set(now.into());
        active.update(&txn).await?;

        let credit = ledger_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(transaction_id),
            account_id: Set(account_id),
            operation_type: Set(OperationType::Credit),
            amount: Set(amount),
            balance_snapshot: Set(new_balance),
            created_at: Set(now.into()),
        };
        credit.insert(&txn).await?;

        txn.commit().await?;
        self.read_cache.invalidate(account_id).await;

        tracing::info!(%transaction_id, %account_id, %amount, "deposit booked");
        Ok(transaction_id)
    }
}
