//! Reversal engine: undoing a booked transaction.
//!
//! The inverse transfer and the original transaction's status flip commit
//! in one atomic unit. A reversal is itself an ordinary transfer, so it
//! leaves the same audit trail (entries, outbox event) as any other.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tally_core::ledger::EntryLeg;
use tally_core::reversal::{ReversalService, RevertCommand};
use uuid::Uuid;

use super::error::{LedgerError, map_lock_error};
use super::transfer::{TransferEngine, set_lock_timeout};
use crate::entities::{ledger_entries, sea_orm_active_enums::TransactionStatus, transactions};

/// Engine orchestrating reversal atomic units.
#[derive(Clone)]
pub struct RevertEngine {
    transfer: TransferEngine,
}

impl RevertEngine {
    /// Creates a new reversal engine on top of the transfer engine.
    #[must_use]
    pub const fn new(transfer: TransferEngine) -> Self {
        Self { transfer }
    }

    /// Reverts a booked transaction, returning the compensating
    /// transaction's id.
    ///
    /// The original row is locked for the whole unit, so two concurrent
    /// reverts of the same transaction serialize and the loser sees
    /// `AlreadyReverted`.
    ///
    /// # Errors
    ///
    /// `TransactionNotFound`, `AlreadyReverted`, `InvalidReversalState`
    /// (only COMPLETED transactions revert), the transfer path's own
    /// failures (the original receiver may have insufficient funds), or
    /// `Database`.
    pub async fn revert(&self, command: RevertCommand) -> Result<Uuid, LedgerError> {
        let transaction_id = command.transaction_id;

        let txn = self.transfer.db().begin().await?;
        set_lock_timeout(&txn, self.transfer.lock_timeout_ms()).await?;

        let original = transactions::Entity::find_by_id(transaction_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_lock_error)?
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?;

        ReversalService::check_revertable(
            transaction_id,
            original.status.into(),
            original.reverted_by_transaction_id,
        )?;

        let legs: Vec<EntryLeg> = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::TransactionId.eq(transaction_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|entry| EntryLeg {
                account_id: entry.account_id,
                operation: entry.operation_type.into(),
                amount: entry.amount,
            })
            .collect();

        let inverse = ReversalService::compose_inverse(transaction_id, &legs, command.reason())?;
        let inverse_id = self.transfer.execute_in(&txn, &inverse).await?;

        let mut active: transactions::ActiveModel = original.into();
        active.status = Set(TransactionStatus::Reverted);
        active.reverted_by_transaction_id = Set(Some(inverse_id));
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        txn.commit().await?;
        self.transfer.finish(&inverse, inverse_id).await;

        tracing::info!(
            original = %transaction_id,
            reversal = %inverse_id,
            "transaction reverted"
        );
        Ok(inverse_id)
    }
}
