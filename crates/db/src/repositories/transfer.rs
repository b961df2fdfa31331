//! Transfer engine: the double-entry booking path.
//!
//! All mutations of a transfer happen in one atomic unit: account balances,
//! the transaction header, both ledger legs, the outbox event, and the
//! durable idempotency record commit together or not at all.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, Set,
    TransactionTrait,
};
use tally_core::ledger::AccountSnapshot;
use tally_core::outbox::TransferCreatedEvent;
use tally_core::transfer::{TransferCommand, TransferService, lock_order};
use uuid::Uuid;

use super::account::lock_account;
use super::cache::ReadCache;
use super::error::{LedgerError, map_lock_error};
use super::idempotency::{IdempotencyCache, IdempotencyRepository};
use super::outbox::OutboxRepository;
use crate::entities::{
    accounts, ledger_entries,
    sea_orm_active_enums::{OperationType, TransactionStatus},
    transactions,
};

/// Engine orchestrating transfer atomic units.
#[derive(Clone)]
pub struct TransferEngine {
    db: DatabaseConnection,
    idempotency: IdempotencyCache,
    read_cache: ReadCache,
    lock_timeout_ms: u64,
}

impl TransferEngine {
    /// Creates a new transfer engine.
    #[must_use]
    pub const fn new(
        db: DatabaseConnection,
        idempotency: IdempotencyCache,
        read_cache: ReadCache,
        lock_timeout_ms: u64,
    ) -> Self {
        Self {
            db,
            idempotency,
            read_cache,
            lock_timeout_ms,
        }
    }

    /// Executes a transfer, returning the booked transaction id.
    ///
    /// Retried submissions carrying the same idempotency key return the
    /// original transaction id without re-validation: a retry of a request
    /// that succeeded must not fail, even if the account has since been
    /// frozen or drained.
    ///
    /// # Errors
    ///
    /// Validation and business-rule failures from the planning logic,
    /// `AccountNotFound`, retryable `LockTimeout`, `OutboxEncoding`, or
    /// `Database`. Any failure after the unit begins rolls back everything.
    pub async fn transfer(&self, command: TransferCommand) -> Result<Uuid, LedgerError> {
        TransferService::validate(&command)?;

        if let Some(key) = &command.idempotency_key {
            if let Some(transaction_id) = self.idempotency.get(key).await {
                tracing::debug!(key, %transaction_id, "idempotency cache hit");
                return Ok(transaction_id);
            }
            if let Some(transaction_id) = IdempotencyRepository::find(&self.db, key).await? {
                tracing::debug!(key, %transaction_id, "durable idempotency hit");
                self.idempotency.put(key.clone(), transaction_id).await;
                return Ok(transaction_id);
            }
        }

        let txn = self.db.begin().await?;
        set_lock_timeout(&txn, self.lock_timeout_ms).await?;
        let transaction_id = self.execute_in(&txn, &command).await?;
        txn.commit().await?;

        self.finish(&command, transaction_id).await;

        tracing::info!(
            %transaction_id,
            from = %command.from_account_id,
            to = %command.to_account_id,
            amount = %command.amount,
            "transfer booked"
        );
        Ok(transaction_id)
    }

    /// Books a transfer inside the caller's already-open atomic unit.
    ///
    /// Used by the reversal engine so the inverse transfer and the original
    /// transaction's status flip commit together. The caller owns the unit
    /// and must have set its lock timeout; the read caches are not touched
    /// here, callers invalidate after their own commit.
    ///
    /// # Errors
    ///
    /// As [`TransferEngine::transfer`], minus the idempotency fast path.
    pub(crate) async fn execute_in(
        &self,
        txn: &DatabaseTransaction,
        command: &TransferCommand,
    ) -> Result<Uuid, LedgerError> {
        let (first, second) = lock_order(command.from_account_id, command.to_account_id);
        let first_row = lock_account(txn, first).await?;
        let second_row = lock_account(txn, second).await?;

        // Re-derive sides: lock order is independent of flow direction.
        let (from_row, to_row) = if first_row.id == command.from_account_id {
            (first_row, second_row)
        } else {
            (second_row, first_row)
        };

        let plan = TransferService::plan(&snapshot(&from_row), &snapshot(&to_row), command.amount)?;

        let now = Utc::now();
        let transaction_id = Uuid::new_v4();
        let header = transactions::ActiveModel {
            id: Set(transaction_id),
            correlation_id: Set(Uuid::new_v4().to_string()),
            description: Set(command.description.clone()),
            status: Set(TransactionStatus::Completed),
            reverted_by_transaction_id: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        header.insert(txn).await?;

        let from_account_id = from_row.id;
        let to_account_id = to_row.id;

        let mut from_active: accounts::ActiveModel = from_row.into();
        from_active.balance = Set(plan.new_from_balance);
        from_active.updated_at = Set(now.into());
        from_active.update(txn).await?;

        let mut to_active: accounts::ActiveModel = to_row.into();
        to_active.balance = Set(plan.new_to_balance);
        to_active.updated_at = Set(now.into());
        to_active.update(txn).await?;

        let debit = ledger_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(transaction_id),
            account_id: Set(from_account_id),
            operation_type: Set(OperationType::Debit),
            amount: Set(command.amount),
            balance_snapshot: Set(plan.new_from_balance),
            created_at: Set(now.into()),
        };
        debit.insert(txn).await?;

        let credit = ledger_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(transaction_id),
            account_id: Set(to_account_id),
            operation_type: Set(OperationType::Credit),
            amount: Set(command.amount),
            balance_snapshot: Set(plan.new_to_balance),
            created_at: Set(now.into()),
        };
        credit.insert(txn).await?;

        let event = TransferCreatedEvent {
            transaction_id,
            from_account_id,
            to_account_id,
            amount: command.amount,
            timestamp: now,
        };
        OutboxRepository::enqueue_transfer_created(txn, &event).await?;

        if let Some(key) = &command.idempotency_key {
            IdempotencyRepository::store(txn, key.clone(), transaction_id).await?;
        }

        Ok(transaction_id)
    }

    /// Post-commit bookkeeping: populate the idempotency cache and drop the
    /// read-side views of both accounts.
    pub(crate) async fn finish(&self, command: &TransferCommand, transaction_id: Uuid) {
        if let Some(key) = &command.idempotency_key {
            self.idempotency.put(key.clone(), transaction_id).await;
        }
        self.read_cache.invalidate(command.from_account_id).await;
        self.read_cache.invalidate(command.to_account_id).await;
    }

    /// The underlying connection, for engines composing larger units.
    #[must_use]
    pub(crate) const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Configured lock-wait ceiling in milliseconds.
    #[must_use]
    pub(crate) const fn lock_timeout_ms(&self) -> u64 {
        self.lock_timeout_ms
    }
}

/// Caps lock waits for the current atomic unit.
///
/// `SET LOCAL` scopes the setting to the open unit, so request handling
/// outside it keeps the server default.
pub(crate) async fn set_lock_timeout<C: ConnectionTrait>(
    db: &C,
    timeout_ms: u64,
) -> Result<(), LedgerError> {
    db.execute_unprepared(&format!("SET LOCAL lock_timeout = '{timeout_ms}ms'"))
        .await
        .map_err(map_lock_error)?;
    Ok(())
}

fn snapshot(account: &accounts::Model) -> AccountSnapshot {
    AccountSnapshot {
        id: account.id,
        status: account.status.into(),
        balance: account.balance,
    }
}
