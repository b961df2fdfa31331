//! `SeaORM` entity definitions for the ledger schema.

pub mod accounts;
pub mod idempotency_keys;
pub mod ledger_entries;
pub mod outbox_events;
pub mod sea_orm_active_enums;
pub mod transactions;
