//! Event payloads published through the transactional outbox.

pub mod event;

pub use event::{AGGREGATE_TYPE_ACCOUNT, EVENT_TYPE_TRANSFER_CREATED, TransferCreatedEvent};
