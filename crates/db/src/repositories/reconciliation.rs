//! Reconciliation job: drift detection between stored balances and the
//! ledger of record.
//!
//! Runs on a fixed interval regardless of traffic. Read-only: plain reads,
//! no row locks, no remediation. Every discrepancy is an operator incident
//! surfaced through error-level logs.

use std::collections::HashMap;
use std::time::Duration;

use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QuerySelect,
};
use tally_core::reconcile::{ReconcileService, StoredBalance};
use tally_shared::config::ReconciliationConfig;
use uuid::Uuid;

use super::error::LedgerError;
use crate::entities::{accounts, ledger_entries};

/// Outcome of one reconciliation sweep.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconciliationSummary {
    /// Accounts compared.
    pub accounts_checked: u64,
    /// Accounts whose stored balance disagrees with the ledger.
    pub discrepancies: u64,
}

/// Periodic balance reconciliation over all accounts.
#[derive(Clone)]
pub struct ReconciliationJob {
    db: DatabaseConnection,
    config: ReconciliationConfig,
}

#[derive(Debug, FromQueryResult)]
struct CalculatedRow {
    account_id: Uuid,
    calculated: Decimal,
}

impl ReconciliationJob {
    /// Creates a new reconciliation job.
    #[must_use]
    pub const fn new(db: DatabaseConnection, config: ReconciliationConfig) -> Self {
        Self { db, config }
    }

    /// Runs sweeps forever at the configured interval.
    ///
    /// A failed sweep is logged and the next tick proceeds; the job never
    /// takes the service down.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.config.interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            match self.run_once().await {
                Ok(summary) if summary.discrepancies > 0 => {
                    tracing::error!(
                        accounts_checked = summary.accounts_checked,
                        discrepancies = summary.discrepancies,
                        "reconciliation sweep found inconsistent accounts"
                    );
                }
                Ok(summary) => {
                    tracing::info!(
                        accounts_checked = summary.accounts_checked,
                        "reconciliation sweep clean"
                    );
                }
                Err(err) => {
                    tracing::error!(error = %err, "reconciliation sweep failed");
                }
            }
        }
    }

    /// Performs one full sweep over all accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn run_once(&self) -> Result<ReconciliationSummary, LedgerError> {
        let mut summary = ReconciliationSummary::default();

        let mut pages = accounts::Entity::find().paginate(&self.db, self.config.batch_size);
        while let Some(page) = pages.fetch_and_next().await? {
            let stored: Vec<StoredBalance> = page
                .iter()
                .map(|account| StoredBalance {
                    account_id: account.id,
                    balance: account.balance,
                })
                .collect();
            let ids: Vec<Uuid> = stored.iter().map(|row| row.account_id).collect();

            let calculated = self.calculated_balances(&ids).await?;
            summary.accounts_checked += stored.len() as u64;

            for discrepancy in ReconcileService::find_discrepancies(&stored, &calculated) {
                summary.discrepancies += 1;
                tracing::error!(
                    account_id = %discrepancy.account_id,
                    stored = %discrepancy.stored,
                    calculated = %discrepancy.calculated,
                    difference = %discrepancy.difference(),
                    "balance discrepancy detected"
                );
            }
        }

        Ok(summary)
    }

    /// One aggregate query per page: the signed sum of every ledger entry,
    /// credits positive, debits negative, grouped by account.
    async fn calculated_balances(
        &self,
        account_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Decimal>, LedgerError> {
        if account_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = ledger_entries::Entity::find()
            .select_only()
            .column(ledger_entries::Column::AccountId)
            .column_as(
                Expr::cust("SUM(CASE WHEN operation_type = 'CREDIT' THEN amount ELSE -amount END)"),
                "calculated",
            )
            .filter(ledger_entries::Column::AccountId.is_in(account_ids.iter().copied()))
            .group_by(ledger_entries::Column::AccountId)
            .into_model::<CalculatedRow>()
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.account_id, row.calculated))
            .collect())
    }
}
