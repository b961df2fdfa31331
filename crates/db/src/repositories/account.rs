//! Account repository: open, balance, and statement reads.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tally_shared::types::{PageRequest, PageResponse, validate_currency_code};
use uuid::Uuid;

use super::cache::ReadCache;
use super::error::{LedgerError, is_unique_violation, map_lock_error};
use crate::entities::{
    accounts, ledger_entries,
    sea_orm_active_enums::AccountStatus,
    transactions,
};

/// One line of an account statement.
#[derive(Debug, Clone)]
pub struct StatementLine {
    /// The ledger entry.
    pub entry: ledger_entries::Model,
    /// Description of the transaction the entry belongs to.
    pub description: String,
}

/// Result of an open-account request.
#[derive(Debug, Clone)]
pub struct OpenedAccount {
    /// The account row.
    pub account: accounts::Model,
    /// Whether this request created the row.
    pub created: bool,
}

/// Account repository for reads and get-or-create.
#[derive(Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
    cache: ReadCache,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, cache: ReadCache) -> Self {
        Self { db, cache }
    }

    /// Opens an account for a client in a currency, returning the existing
    /// row when one is already open.
    ///
    /// A concurrent duplicate request can lose the insert race against the
    /// `(client_id, currency)` unique constraint; the loser re-reads and
    /// returns the winner's row.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty client id or a malformed currency code,
    /// `Database` on query failure.
    pub async fn open(
        &self,
        client_id: &str,
        currency: &str,
    ) -> Result<OpenedAccount, LedgerError> {
        let client_id = client_id.trim();
        if client_id.is_empty() {
            return Err(LedgerError::Validation("client id must not be empty".to_string()));
        }
        validate_currency_code(currency).map_err(LedgerError::Validation)?;

        if let Some(existing) = self.find_by_client(client_id, currency).await? {
            return Ok(OpenedAccount {
                account: existing,
                created: false,
            });
        }

        let now = Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(Uuid::new_v4()),
            client_id: Set(client_id.to_string()),
            currency: Set(currency.to_string()),
            balance: Set(Decimal::ZERO),
            status: Set(AccountStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match account.insert(&self.db).await {
            Ok(model) => Ok(OpenedAccount {
                account: model,
                created: true,
            }),
            Err(err) if is_unique_violation(&err) => {
                let existing = self
                    .find_by_client(client_id, currency)
                    .await?
                    .ok_or(LedgerError::Database(err))?;
                Ok(OpenedAccount {
                    account: existing,
                    created: false,
                })
            }
            Err(err) => Err(LedgerError::Database(err)),
        }
    }

    /// Reads an account by id, serving from the read cache when warm.
    ///
    /// The cached view is dropped by the engines after every committed
    /// mutation of the account, so a read after a transfer or deposit
    /// always reflects it.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` or `Database`.
    pub async fn get(&self, account_id: Uuid) -> Result<accounts::Model, LedgerError> {
        if let Some(account) = self.cache.account(account_id).await {
            return Ok(account);
        }

        let account = accounts::Entity::find_by_id(account_id)
            .one(&self.db)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id))?;

        self.cache.put_account(account.clone()).await;
        Ok(account)
    }

    /// Reads a page of the account's statement, newest entries first, each
    /// line joined with its transaction description. The first page is
    /// served from the read cache when warm.
    ///
    /// # Errors
    ///
    /// `AccountNotFound` or `Database`.
    pub async fn statement(
        &self,
        account_id: Uuid,
        page: PageRequest,
    ) -> Result<PageResponse<StatementLine>, LedgerError> {
        // Distinguishes an empty statement from a missing account.
        let _ = self.get(account_id).await?;

        let is_first_default_page = page.page <= 1 && page.per_page == PageRequest::default().per_page;
        let total = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::AccountId.eq(account_id))
            .count(&self.db)
            .await?;

        if is_first_default_page {
            if let Some(cached) = self.cache.first_page(account_id).await {
                let lines = cached
                    .into_iter()
                    .map(|(entry, description)| StatementLine { entry, description })
                    .collect();
                return Ok(PageResponse::new(lines, page.page, page.per_page, total));
            }
        }

        let rows = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::AccountId.eq(account_id))
            .find_also_related(transactions::Entity)
            .order_by_desc(ledger_entries::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let lines: Vec<StatementLine> = rows
            .into_iter()
            .map(|(entry, transaction)| StatementLine {
                description: transaction.map(|t| t.description).unwrap_or_default(),
                entry,
            })
            .collect();

        if is_first_default_page {
            let cacheable = lines
                .iter()
                .map(|line| (line.entry.clone(), line.description.clone()))
                .collect();
            self.cache.put_first_page(account_id, cacheable).await;
        }

        Ok(PageResponse::new(lines, page.page, page.per_page, total))
    }

    async fn find_by_client(
        &self,
        client_id: &str,
        currency: &str,
    ) -> Result<Option<accounts::Model>, LedgerError> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::ClientId.eq(client_id))
            .filter(accounts::Column::Currency.eq(currency))
            .one(&self.db)
            .await?;
        Ok(account)
    }
}

/// Loads an account row under `FOR UPDATE` inside the caller's atomic unit.
///
/// # Errors
///
/// `AccountNotFound`, `LockTimeout` when the lock wait exceeds the unit's
/// `SET LOCAL lock_timeout`, or `Database`.
pub async fn lock_account<C: ConnectionTrait>(
    db: &C,
    account_id: Uuid,
) -> Result<accounts::Model, LedgerError> {
    accounts::Entity::find_by_id(account_id)
        .lock_exclusive()
        .one(db)
        .await
        .map_err(map_lock_error)?
        .ok_or(LedgerError::AccountNotFound(account_id))
}
