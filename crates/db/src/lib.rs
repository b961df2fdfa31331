//! Database layer with `SeaORM` entities and ledger engines.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the ledger schema
//! - Repositories and engines that orchestrate atomic units
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountRepository, DepositEngine, ReconciliationJob, RevertEngine, TransferEngine,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
