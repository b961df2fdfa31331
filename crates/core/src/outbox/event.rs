//! The transfer event published to downstream consumers.
//!
//! Field names are a wire contract consumed by external relays. Changing
//! them breaks every consumer, so they are pinned by tests below.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Aggregate type recorded on every transfer outbox row.
pub const AGGREGATE_TYPE_ACCOUNT: &str = "ACCOUNT";

/// Event type recorded on every transfer outbox row.
pub const EVENT_TYPE_TRANSFER_CREATED: &str = "TRANSFER_CREATED";

/// Payload of a `TRANSFER_CREATED` outbox event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferCreatedEvent {
    /// The booked transaction.
    pub transaction_id: Uuid,
    /// Debited account.
    pub from_account_id: Uuid,
    /// Credited account.
    pub to_account_id: Uuid,
    /// Amount moved.
    pub amount: Decimal,
    /// Booking time.
    pub timestamp: DateTime<Utc>,
}

impl TransferCreatedEvent {
    /// Encodes the payload as the JSON document stored in the outbox row.
    ///
    /// # Errors
    ///
    /// Returns the underlying serialization error; the caller must treat it
    /// as fatal for the whole atomic unit, never book a transfer without its
    /// event.
    pub fn encode(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn event() -> TransferCreatedEvent {
        TransferCreatedEvent {
            transaction_id: Uuid::nil(),
            from_account_id: Uuid::nil(),
            to_account_id: Uuid::nil(),
            amount: dec!(42.50),
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn test_encodes_camel_case_field_names() {
        let value = event().encode().unwrap();

        let object = value.as_object().unwrap();
        assert!(object.contains_key("transactionId"));
        assert!(object.contains_key("fromAccountId"));
        assert!(object.contains_key("toAccountId"));
        assert!(object.contains_key("amount"));
        assert!(object.contains_key("timestamp"));
        assert_eq!(object.len(), 5);
    }

    #[test]
    fn test_amount_survives_round_trip() {
        let value = event().encode().unwrap();
        let decoded: TransferCreatedEvent = serde_json::from_value(value).unwrap();
        assert_eq!(decoded.amount, dec!(42.50));
    }

    #[test]
    fn test_envelope_constants() {
        assert_eq!(AGGREGATE_TYPE_ACCOUNT, "ACCOUNT");
        assert_eq!(EVENT_TYPE_TRANSFER_CREATED, "TRANSFER_CREATED");
    }
}
