//! Two-tier idempotency store.
//!
//! Tier 1 is a volatile in-process cache keyed by the client's idempotency
//! key; tier 2 is the durable `idempotency_keys` table whose primary key is
//! the final guard against double booking. The cache is disposable, a miss
//! only costs the durable lookup.

use std::time::Duration;

use moka::future::Cache;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{LedgerError, is_unique_violation};
use crate::entities::idempotency_keys;

/// The durable response body stored per key.
///
/// Field name is a stored-data contract shared with the original records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResponse {
    /// The transaction the original request booked.
    #[serde(rename = "transactionId")]
    pub transaction_id: Uuid,
}

/// Volatile key -> transaction id cache.
#[derive(Clone)]
pub struct IdempotencyCache {
    inner: Cache<String, Uuid>,
}

impl IdempotencyCache {
    /// Creates the cache with the given capacity and TTL.
    #[must_use]
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Fast-path lookup.
    pub async fn get(&self, key: &str) -> Option<Uuid> {
        self.inner.get(key).await
    }

    /// Records a booked transaction under its key.
    pub async fn put(&self, key: String, transaction_id: Uuid) {
        self.inner.insert(key, transaction_id).await;
    }
}

/// Durable idempotency store operations.
pub struct IdempotencyRepository;

impl IdempotencyRepository {
    /// Looks up the durable record for a key and decodes its stored body.
    ///
    /// A record with an undecodable body is treated as absent after a
    /// warning; the primary key still prevents a second booking under the
    /// same key, so the caller fails loudly instead of replaying garbage.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find<C: ConnectionTrait>(db: &C, key: &str) -> Result<Option<Uuid>, DbErr> {
        let Some(record) = idempotency_keys::Entity::find_by_id(key.to_string())
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        match serde_json::from_value::<StoredResponse>(record.response_body) {
            Ok(stored) => Ok(Some(stored.transaction_id)),
            Err(err) => {
                tracing::warn!(key, error = %err, "undecodable idempotency record");
                Ok(None)
            }
        }
    }

    /// Inserts the durable record inside the caller's atomic unit.
    ///
    /// A concurrent request racing on the same key loses here when the
    /// winner commits first: the primary-key violation surfaces as
    /// `DuplicateKey` (a conflict, not a database fault), the loser's unit
    /// rolls back, and a retry replays the winner's transaction id through
    /// the durable lookup.
    ///
    /// # Errors
    ///
    /// `DuplicateKey` when the key is already claimed, `Database` otherwise.
    pub async fn store<C: ConnectionTrait>(
        db: &C,
        key: String,
        transaction_id: Uuid,
    ) -> Result<(), LedgerError> {
        let body = serde_json::to_value(StoredResponse { transaction_id })
            .map_err(|err| DbErr::Custom(err.to_string()))?;

        let record = idempotency_keys::ActiveModel {
            key: Set(key.clone()),
            response_status: Set(200),
            response_body: Set(body),
            created_at: Set(chrono::Utc::now().into()),
        };
        match record.insert(db).await {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(LedgerError::DuplicateKey(key)),
            Err(err) => Err(LedgerError::Database(err)),
        }
    }
}
