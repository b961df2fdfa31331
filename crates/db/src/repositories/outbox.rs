//! Transactional outbox writes.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use tally_core::outbox::{AGGREGATE_TYPE_ACCOUNT, EVENT_TYPE_TRANSFER_CREATED, TransferCreatedEvent};
use uuid::Uuid;

use super::error::LedgerError;
use crate::entities::outbox_events;

/// Writes outbox rows inside the caller's atomic unit.
pub struct OutboxRepository;

impl OutboxRepository {
    /// Enqueues a `TRANSFER_CREATED` event.
    ///
    /// The aggregate id is the debited account: downstream consumers key
    /// their streams by the account that initiated the movement.
    ///
    /// # Errors
    ///
    /// `OutboxEncoding` if the payload cannot be serialized, `Database` if
    /// the insert fails; either way the caller must abort the unit. A
    /// transfer is never booked without its event.
    pub async fn enqueue_transfer_created<C: ConnectionTrait>(
        db: &C,
        event: &TransferCreatedEvent,
    ) -> Result<(), LedgerError> {
        let payload = event.encode()?;

        let row = outbox_events::ActiveModel {
            id: Set(Uuid::new_v4()),
            aggregate_type: Set(AGGREGATE_TYPE_ACCOUNT.to_string()),
            aggregate_id: Set(event.from_account_id),
            event_type: Set(EVENT_TYPE_TRANSFER_CREATED.to_string()),
            payload: Set(payload),
            processed: Set(false),
            created_at: Set(Utc::now().into()),
        };
        row.insert(db).await?;
        Ok(())
    }
}
