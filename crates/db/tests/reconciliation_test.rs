//! Integration tests for the reconciliation sweep.
//!
//! Skipped when `DATABASE_URL` is unset.

use std::env;
use std::time::Duration;

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, EntityTrait, Set};
use sea_orm_migration::MigratorTrait;
use tally_shared::config::ReconciliationConfig;
use uuid::Uuid;

use tally_db::entities::accounts;
use tally_db::migration::Migrator;
use tally_db::repositories::{
    AccountRepository, DepositEngine, ReadCache, ReconciliationJob,
};

async fn setup() -> Option<(DatabaseConnection, AccountRepository, DepositEngine)> {
    let Ok(url) = env::var("DATABASE_URL") else {
        return None;
    };
    let db = Database::connect(&url)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None).await.expect("Failed to migrate");

    let cache = ReadCache::new(100, Duration::from_secs(60));
    Some((
        db.clone(),
        AccountRepository::new(db.clone(), cache.clone()),
        DepositEngine::new(db, cache, 5000),
    ))
}

#[tokio::test]
async fn test_sweep_reports_manufactured_drift() {
    let Some((db, accounts, deposits)) = setup().await else {
        return;
    };

    let opened = accounts
        .open(&format!("client-{}", Uuid::new_v4()), "USD")
        .await
        .unwrap();
    deposits
        .deposit(opened.account.id, Decimal::new(100_00, 2), None)
        .await
        .unwrap();

    // Corrupt the stored balance behind the ledger's back.
    let account = accounts::Entity::find_by_id(opened.account.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let mut active: accounts::ActiveModel = account.into();
    active.balance = Set(Decimal::new(999_99, 2));
    active.update(&db).await.unwrap();

    let job = ReconciliationJob::new(db, ReconciliationConfig::default());
    let summary = job.run_once().await.unwrap();

    assert!(summary.accounts_checked >= 1);
    assert!(summary.discrepancies >= 1);
}

#[tokio::test]
async fn test_sweep_runs_over_empty_page_boundaries() {
    let Some((db, accounts, _)) = setup().await else {
        return;
    };

    // A fresh zero-balance account with no ledger entries must not count
    // as a discrepancy (missing aggregate means zero).
    accounts
        .open(&format!("client-{}", Uuid::new_v4()), "USD")
        .await
        .unwrap();

    let job = ReconciliationJob::new(
        db,
        ReconciliationConfig {
            interval_secs: 60,
            batch_size: 2,
        },
    );
    let summary = job.run_once().await.unwrap();
    assert!(summary.accounts_checked >= 1);
}
