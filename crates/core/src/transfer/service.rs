//! Pure transfer planning: validation, lock ordering, balance math.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::TransferError;
use crate::ledger::AccountSnapshot;

/// Command to move money between two accounts.
#[derive(Debug, Clone)]
pub struct TransferCommand {
    /// Account to debit.
    pub from_account_id: Uuid,
    /// Account to credit.
    pub to_account_id: Uuid,
    /// Positive amount to move.
    pub amount: Decimal,
    /// Statement description.
    pub description: String,
    /// Optional client-supplied idempotency key. Absence means the client
    /// requested no idempotency guarantee.
    pub idempotency_key: Option<String>,
}

/// The computed effect of a valid transfer on both accounts.
///
/// `new_from_balance` doubles as the DEBIT leg's balance snapshot and
/// `new_to_balance` as the CREDIT leg's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPlan {
    /// Source balance after the debit.
    pub new_from_balance: Decimal,
    /// Target balance after the credit.
    pub new_to_balance: Decimal,
}

/// Returns the two account ids in the global locking order.
///
/// The order is total and stable (byte order of the UUIDs), so any two
/// concurrent transfers touching the same pair always request their row
/// locks in the same sequence and no lock cycle can form. Lock order is
/// independent of which side is debited.
#[must_use]
pub fn lock_order(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Stateless transfer planning logic.
pub struct TransferService;

impl TransferService {
    /// Validates a command before any I/O is attempted.
    ///
    /// # Errors
    ///
    /// `NonPositiveAmount` or `SelfTransfer`.
    pub fn validate(command: &TransferCommand) -> Result<(), TransferError> {
        if command.amount <= Decimal::ZERO {
            return Err(TransferError::NonPositiveAmount(command.amount));
        }
        if command.from_account_id == command.to_account_id {
            return Err(TransferError::SelfTransfer(command.from_account_id));
        }
        Ok(())
    }

    /// Decides a transfer against the two locked account rows.
    ///
    /// Both accounts must be transactable and the source must cover the
    /// amount; on success the resulting balances are returned. Conservation
    /// holds by construction: the sum of both balances is unchanged.
    ///
    /// # Errors
    ///
    /// `NotTransactable` (source checked first) or `InsufficientFunds`.
    pub fn plan(
        from: &AccountSnapshot,
        to: &AccountSnapshot,
        amount: Decimal,
    ) -> Result<TransferPlan, TransferError> {
        if !from.status.can_transact() {
            return Err(TransferError::NotTransactable {
                account_id: from.id,
                status: from.status,
            });
        }
        if !to.status.can_transact() {
            return Err(TransferError::NotTransactable {
                account_id: to.id,
                status: to.status,
            });
        }
        if from.balance < amount {
            return Err(TransferError::InsufficientFunds {
                account_id: from.id,
                balance: from.balance,
                requested: amount,
            });
        }

        Ok(TransferPlan {
            new_from_balance: from.balance - amount,
            new_to_balance: to.balance + amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::AccountStatus;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn snapshot(status: AccountStatus, balance: Decimal) -> AccountSnapshot {
        AccountSnapshot {
            id: Uuid::new_v4(),
            status,
            balance,
        }
    }

    fn command(amount: Decimal) -> TransferCommand {
        TransferCommand {
            from_account_id: Uuid::new_v4(),
            to_account_id: Uuid::new_v4(),
            amount,
            description: "rent".to_string(),
            idempotency_key: None,
        }
    }

    #[test]
    fn test_validate_accepts_positive_amount() {
        assert!(TransferService::validate(&command(dec!(0.0001))).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_and_negative() {
        assert_eq!(
            TransferService::validate(&command(dec!(0))),
            Err(TransferError::NonPositiveAmount(dec!(0)))
        );
        assert!(matches!(
            TransferService::validate(&command(dec!(-10))),
            Err(TransferError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_validate_rejects_self_transfer() {
        let id = Uuid::new_v4();
        let cmd = TransferCommand {
            from_account_id: id,
            to_account_id: id,
            amount: dec!(10),
            description: String::new(),
            idempotency_key: None,
        };
        assert_eq!(
            TransferService::validate(&cmd),
            Err(TransferError::SelfTransfer(id))
        );
    }

    #[test]
    fn test_plan_moves_amount() {
        let from = snapshot(AccountStatus::Active, dec!(100.00));
        let to = snapshot(AccountStatus::Active, dec!(0.00));

        let plan = TransferService::plan(&from, &to, dec!(50.00)).unwrap();
        assert_eq!(plan.new_from_balance, dec!(50.00));
        assert_eq!(plan.new_to_balance, dec!(50.00));
    }

    #[test]
    fn test_plan_allows_exact_balance() {
        let from = snapshot(AccountStatus::Active, dec!(25));
        let to = snapshot(AccountStatus::Active, dec!(0));

        let plan = TransferService::plan(&from, &to, dec!(25)).unwrap();
        assert_eq!(plan.new_from_balance, dec!(0));
    }

    #[test]
    fn test_plan_insufficient_funds() {
        let from = snapshot(AccountStatus::Active, dec!(50.00));
        let to = snapshot(AccountStatus::Active, dec!(50.00));

        let err = TransferService::plan(&from, &to, dec!(200.00)).unwrap_err();
        assert_eq!(
            err,
            TransferError::InsufficientFunds {
                account_id: from.id,
                balance: dec!(50.00),
                requested: dec!(200.00),
            }
        );
    }

    #[test]
    fn test_plan_rejects_frozen_source() {
        let from = snapshot(AccountStatus::Frozen, dec!(100));
        let to = snapshot(AccountStatus::Active, dec!(0));

        let err = TransferService::plan(&from, &to, dec!(10)).unwrap_err();
        assert_eq!(
            err,
            TransferError::NotTransactable {
                account_id: from.id,
                status: AccountStatus::Frozen,
            }
        );
    }

    #[test]
    fn test_plan_rejects_closed_target() {
        let from = snapshot(AccountStatus::Active, dec!(100));
        let to = snapshot(AccountStatus::Closed, dec!(0));

        let err = TransferService::plan(&from, &to, dec!(10)).unwrap_err();
        assert_eq!(
            err,
            TransferError::NotTransactable {
                account_id: to.id,
                status: AccountStatus::Closed,
            }
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Lock order is symmetric: both argument orders yield the same pair.
        #[test]
        fn prop_lock_order_symmetric(a in any::<u128>(), b in any::<u128>()) {
            let (a, b) = (Uuid::from_u128(a), Uuid::from_u128(b));
            prop_assert_eq!(lock_order(a, b), lock_order(b, a));
        }

        /// Lock order always returns the pair sorted ascending.
        #[test]
        fn prop_lock_order_sorted(a in any::<u128>(), b in any::<u128>()) {
            let (a, b) = (Uuid::from_u128(a), Uuid::from_u128(b));
            let (first, second) = lock_order(a, b);
            prop_assert!(first <= second);
        }

        /// A successful plan conserves money: total balance is unchanged.
        #[test]
        fn prop_plan_conserves_total(
            from_balance in 0i64..1_000_000_000i64,
            to_balance in 0i64..1_000_000_000i64,
            amount in 1i64..1_000_000_000i64,
        ) {
            let from = snapshot(AccountStatus::Active, Decimal::new(from_balance, 4));
            let to = snapshot(AccountStatus::Active, Decimal::new(to_balance, 4));
            let amount = Decimal::new(amount, 4);

            if let Ok(plan) = TransferService::plan(&from, &to, amount) {
                prop_assert_eq!(
                    plan.new_from_balance + plan.new_to_balance,
                    from.balance + to.balance
                );
                prop_assert!(plan.new_from_balance >= Decimal::ZERO);
            } else {
                prop_assert!(from.balance < amount);
            }
        }
    }
}
