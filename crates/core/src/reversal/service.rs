//! Deriving the inverse transfer command from a booked transaction.

use uuid::Uuid;

use super::error::ReversalError;
use crate::ledger::{EntryLeg, OperationType, TransactionStatus};
use crate::transfer::TransferCommand;

/// Reason recorded when the operator supplies none.
pub const DEFAULT_REVERSAL_REASON: &str = "Administrative Reversal";

/// Request to undo a previously booked transaction.
#[derive(Debug, Clone)]
pub struct RevertCommand {
    /// The transaction to undo.
    pub transaction_id: Uuid,
    /// Optional operator-supplied reason for the audit trail.
    pub reason: Option<String>,
}

impl RevertCommand {
    /// The reason to record, falling back to [`DEFAULT_REVERSAL_REASON`].
    #[must_use]
    pub fn reason(&self) -> &str {
        self.reason
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(DEFAULT_REVERSAL_REASON)
    }
}

/// Stateless reversal composition logic.
pub struct ReversalService;

impl ReversalService {
    /// Checks that a transaction is in a revertable state.
    ///
    /// # Errors
    ///
    /// `AlreadyReverted` when the transaction is `Reverted` or already has a
    /// compensating transaction recorded, `InvalidState` for any status other
    /// than `Completed`.
    pub fn check_revertable(
        transaction_id: Uuid,
        status: TransactionStatus,
        reverted_by: Option<Uuid>,
    ) -> Result<(), ReversalError> {
        if status == TransactionStatus::Reverted || reverted_by.is_some() {
            return Err(ReversalError::AlreadyReverted(transaction_id));
        }
        if status != TransactionStatus::Completed {
            return Err(ReversalError::InvalidState {
                transaction_id,
                status,
            });
        }
        Ok(())
    }

    /// Builds the inverse transfer from the original transaction's ledger
    /// legs: the original creditor pays the original debtor back.
    ///
    /// The returned command carries a fresh idempotency key so the inverse
    /// booking never collides with the original submission.
    ///
    /// # Errors
    ///
    /// `MalformedEntries` when the legs are not exactly one debit and one
    /// credit of the same amount.
    pub fn compose_inverse(
        transaction_id: Uuid,
        entries: &[EntryLeg],
        reason: &str,
    ) -> Result<TransferCommand, ReversalError> {
        let debit = entries
            .iter()
            .find(|e| e.operation == OperationType::Debit);
        let credit = entries
            .iter()
            .find(|e| e.operation == OperationType::Credit);

        let (Some(debit), Some(credit)) = (debit, credit) else {
            return Err(ReversalError::MalformedEntries(transaction_id));
        };
        if entries.len() != 2 || debit.amount != credit.amount {
            return Err(ReversalError::MalformedEntries(transaction_id));
        }

        Ok(TransferCommand {
            from_account_id: credit.account_id,
            to_account_id: debit.account_id,
            amount: debit.amount,
            description: format!("REVERSAL of {transaction_id}: {reason}"),
            idempotency_key: Some(Uuid::new_v4().to_string()),
        })
    }
}
