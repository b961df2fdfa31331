//! Read-side caches for account and statement lookups.
//!
//! Populated on read, invalidated explicitly by the engines after every
//! committed mutation touching the account. The database stays the source
//! of truth; losing the cache only costs a query.

use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

use crate::entities::{accounts, ledger_entries};

/// Cached first page of an account statement.
pub type StatementPage = Vec<(ledger_entries::Model, String)>;

/// Volatile read-side cache for account views and first statement pages.
#[derive(Clone)]
pub struct ReadCache {
    accounts: Cache<Uuid, accounts::Model>,
    first_pages: Cache<Uuid, StatementPage>,
}

impl ReadCache {
    /// Creates the cache with the given capacity and entry TTL.
    #[must_use]
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            accounts: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            first_pages: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Looks up a cached account view.
    pub async fn account(&self, account_id: Uuid) -> Option<accounts::Model> {
        self.accounts.get(&account_id).await
    }

    /// Stores an account view read from the database.
    pub async fn put_account(&self, account: accounts::Model) {
        self.accounts.insert(account.id, account).await;
    }

    /// Looks up a cached first statement page.
    pub async fn first_page(&self, account_id: Uuid) -> Option<StatementPage> {
        self.first_pages.get(&account_id).await
    }

    /// Stores a first statement page read from the database.
    pub async fn put_first_page(&self, account_id: Uuid, page: StatementPage) {
        self.first_pages.insert(account_id, page).await;
    }

    /// Drops every cached view of the account after a committed mutation.
    pub async fn invalidate(&self, account_id: Uuid) {
        self.accounts.invalidate(&account_id).await;
        self.first_pages.invalidate(&account_id).await;
    }
}
