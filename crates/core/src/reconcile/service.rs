//! Comparing stored account balances against ledger-derived sums.
//!
//! The db crate feeds this one page of accounts at a time together with the
//! ledger aggregate for those accounts. Detection only: nothing here mutates
//! state, an operator investigates every hit.

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

/// A stored balance as read from the accounts table.
#[derive(Debug, Clone, Copy)]
pub struct StoredBalance {
    /// The account.
    pub account_id: Uuid,
    /// Its `balance` column.
    pub balance: Decimal,
}

/// An account whose stored balance disagrees with its ledger history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discrepancy {
    /// The inconsistent account.
    pub account_id: Uuid,
    /// Balance in the accounts table.
    pub stored: Decimal,
    /// Signed sum of the account's ledger entries.
    pub calculated: Decimal,
}

impl Discrepancy {
    /// How far the stored balance drifted from the ledger truth.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.stored - self.calculated
    }
}

/// Stateless reconciliation comparison.
pub struct ReconcileService;

impl ReconcileService {
    /// Compares a page of stored balances against the calculated sums.
    ///
    /// An account absent from `calculated` has no ledger entries and its
    /// derived balance is zero. A freshly opened account with a zero stored
    /// balance is therefore consistent.
    #[must_use]
    pub fn find_discrepancies(
        stored: &[StoredBalance],
        calculated: &HashMap<Uuid, Decimal>,
    ) -> Vec<Discrepancy> {
        stored
            .iter()
            .filter_map(|row| {
                let derived = calculated
                    .get(&row.account_id)
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                (row.balance != derived).then_some(Discrepancy {
                    account_id: row.account_id,
                    stored: row.balance,
                    calculated: derived,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_matching_balances_produce_no_discrepancy() {
        let id = Uuid::new_v4();
        let stored = vec![StoredBalance {
            account_id: id,
            balance: dec!(100.00),
        }];
        let calculated = HashMap::from([(id, dec!(100.00))]);

        assert!(ReconcileService::find_discrepancies(&stored, &calculated).is_empty());
    }

    #[test]
    fn test_drift_is_reported() {
        let id = Uuid::new_v4();
        let stored = vec![StoredBalance {
            account_id: id,
            balance: dec!(100.00),
        }];
        let calculated = HashMap::from([(id, dec!(90.00))]);

        let found = ReconcileService::find_discrepancies(&stored, &calculated);
        assert_eq!(
            found,
            vec![Discrepancy {
                account_id: id,
                stored: dec!(100.00),
                calculated: dec!(90.00),
            }]
        );
        assert_eq!(found[0].difference(), dec!(10.00));
    }

    #[test]
    fn test_missing_aggregate_means_zero() {
        let clean = Uuid::new_v4();
        let drifted = Uuid::new_v4();
        let stored = vec![
            StoredBalance {
                account_id: clean,
                balance: dec!(0),
            },
            StoredBalance {
                account_id: drifted,
                balance: dec!(5.00),
            },
        ];
        let calculated = HashMap::new();

        let found = ReconcileService::find_discrepancies(&stored, &calculated);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].account_id, drifted);
        assert_eq!(found[0].calculated, dec!(0));
    }

    #[test]
    fn test_scale_differences_with_equal_value_are_consistent() {
        // NUMERIC comparison semantics: 100 and 100.0000 are the same money.
        let id = Uuid::new_v4();
        let stored = vec![StoredBalance {
            account_id: id,
            balance: dec!(100),
        }];
        let calculated = HashMap::from([(id, dec!(100.0000))]);

        assert!(ReconcileService::find_discrepancies(&stored, &calculated).is_empty());
    }
}
