//! Integration tests for the ledger engines against a real Postgres.
//!
//! Tests run only when `DATABASE_URL` is set; without it each test exits
//! early so the suite passes in environments without a database.

use std::env;
use std::time::Duration;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use sea_orm_migration::MigratorTrait;
use tally_core::reversal::RevertCommand;
use tally_core::transfer::TransferCommand;
use uuid::Uuid;

use tally_db::entities::{
    accounts, idempotency_keys, ledger_entries, outbox_events,
    sea_orm_active_enums::{AccountStatus, OperationType, TransactionStatus},
    transactions,
};
use tally_db::migration::Migrator;
use tally_db::repositories::{
    AccountRepository, DepositEngine, IdempotencyCache, LedgerError, ReadCache, RevertEngine,
    TransferEngine,
};

struct TestContext {
    db: DatabaseConnection,
    accounts: AccountRepository,
    transfers: TransferEngine,
    deposits: DepositEngine,
    reverts: RevertEngine,
}

async fn setup() -> Option<TestContext> {
    let Ok(url) = env::var("DATABASE_URL") else {
        return None;
    };
    let db = Database::connect(&url)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None).await.expect("Failed to migrate");

    let read_cache = ReadCache::new(1000, Duration::from_secs(60));
    let idempotency = IdempotencyCache::new(1000, Duration::from_secs(60));
    let transfers = TransferEngine::new(db.clone(), idempotency, read_cache.clone(), 5000);

    Some(TestContext {
        accounts: AccountRepository::new(db.clone(), read_cache.clone()),
        deposits: DepositEngine::new(db.clone(), read_cache, 5000),
        reverts: RevertEngine::new(transfers.clone()),
        transfers,
        db,
    })
}

fn fresh_client() -> String {
    format!("client-{}", Uuid::new_v4())
}

async fn funded_account(ctx: &TestContext, amount: Decimal) -> Uuid {
    let opened = ctx
        .accounts
        .open(&fresh_client(), "USD")
        .await
        .expect("Failed to open account");
    if amount > Decimal::ZERO {
        ctx.deposits
            .deposit(opened.account.id, amount, None)
            .await
            .expect("Failed to fund account");
    }
    opened.account.id
}

async fn balance_of(ctx: &TestContext, account_id: Uuid) -> Decimal {
    ctx.accounts
        .get(account_id)
        .await
        .expect("Failed to read account")
        .balance
}

fn transfer_command(from: Uuid, to: Uuid, amount: Decimal) -> TransferCommand {
    TransferCommand {
        from_account_id: from,
        to_account_id: to,
        amount,
        description: "test transfer".to_string(),
        idempotency_key: Some(Uuid::new_v4().to_string()),
    }
}

#[tokio::test]
async fn test_open_account_is_get_or_create() {
    let Some(ctx) = setup().await else { return };

    let client = fresh_client();
    let first = ctx.accounts.open(&client, "USD").await.unwrap();
    assert!(first.created);
    assert_eq!(first.account.balance, Decimal::ZERO);

    let second = ctx.accounts.open(&client, "USD").await.unwrap();
    assert!(!second.created);
    assert_eq!(second.account.id, first.account.id);

    // Same client, different currency is a different account.
    let other = ctx.accounts.open(&client, "EUR").await.unwrap();
    assert!(other.created);
    assert_ne!(other.account.id, first.account.id);
}

#[tokio::test]
async fn test_deposit_credits_balance_and_writes_single_leg() {
    let Some(ctx) = setup().await else { return };

    let account_id = funded_account(&ctx, Decimal::ZERO).await;
    let tx_id = ctx
        .deposits
        .deposit(account_id, Decimal::new(100_00, 2), None)
        .await
        .unwrap();

    assert_eq!(
        balance_of(&ctx, account_id).await,
        Decimal::new(100_00, 2)
    );

    let entries = ledger_entries::Entity::find()
        .filter(ledger_entries::Column::TransactionId.eq(tx_id))
        .all(&ctx.db)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].operation_type, OperationType::Credit);
    assert_eq!(entries[0].balance_snapshot, Decimal::new(100_00, 2));

    let header = transactions::Entity::find_by_id(tx_id)
        .one(&ctx.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(header.description, "Cash-in");
    assert_eq!(header.status, TransactionStatus::Completed);
}

#[tokio::test]
async fn test_transfer_moves_money_with_double_entry() {
    let Some(ctx) = setup().await else { return };

    let alice = funded_account(&ctx, Decimal::new(100_00, 2)).await;
    let bob = funded_account(&ctx, Decimal::ZERO).await;

    let tx_id = ctx
        .transfers
        .transfer(transfer_command(alice, bob, Decimal::new(30_00, 2)))
        .await
        .unwrap();

    assert_eq!(
        balance_of(&ctx, alice).await,
        Decimal::new(70_00, 2)
    );
    assert_eq!(
        balance_of(&ctx, bob).await,
        Decimal::new(30_00, 2)
    );

    let entries = ledger_entries::Entity::find()
        .filter(ledger_entries::Column::TransactionId.eq(tx_id))
        .all(&ctx.db)
        .await
        .unwrap();
    assert_eq!(entries.len(), 2);

    let debit = entries
        .iter()
        .find(|e| e.operation_type == OperationType::Debit)
        .unwrap();
    let credit = entries
        .iter()
        .find(|e| e.operation_type == OperationType::Credit)
        .unwrap();
    assert_eq!(debit.account_id, alice);
    assert_eq!(debit.balance_snapshot, Decimal::new(70_00, 2));
    assert_eq!(credit.account_id, bob);
    assert_eq!(credit.balance_snapshot, Decimal::new(30_00, 2));
    assert_eq!(debit.amount, credit.amount);

    let events = outbox_events::Entity::find()
        .filter(outbox_events::Column::AggregateId.eq(alice))
        .all(&ctx.db)
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "TRANSFER_CREATED");
    assert!(!events[0].processed);
    assert_eq!(
        events[0].payload.get("transactionId").unwrap().as_str(),
        Some(tx_id.to_string().as_str())
    );
}

#[tokio::test]
async fn test_insufficient_funds_leaves_no_trace() {
    let Some(ctx) = setup().await else { return };

    let alice = funded_account(&ctx, Decimal::new(50_00, 2)).await;
    let bob = funded_account(&ctx, Decimal::ZERO).await;

    let command = transfer_command(alice, bob, Decimal::new(200_00, 2));
    let key = command.idempotency_key.clone().unwrap();
    let err = ctx.transfers.transfer(command).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Transfer(tally_core::transfer::TransferError::InsufficientFunds { .. })
    ));

    // Balances untouched, no orphan rows from the failed unit.
    assert_eq!(
        balance_of(&ctx, alice).await,
        Decimal::new(50_00, 2)
    );
    assert_eq!(balance_of(&ctx, bob).await, Decimal::ZERO);

    let stored_key = idempotency_keys::Entity::find_by_id(key)
        .one(&ctx.db)
        .await
        .unwrap();
    assert!(stored_key.is_none());

    let bob_entries = ledger_entries::Entity::find()
        .filter(ledger_entries::Column::AccountId.eq(bob))
        .all(&ctx.db)
        .await
        .unwrap();
    assert!(bob_entries.is_empty());
}

#[tokio::test]
async fn test_double_submit_books_exactly_once() {
    let Some(ctx) = setup().await else { return };

    let alice = funded_account(&ctx, Decimal::new(100_00, 2)).await;
    let bob = funded_account(&ctx, Decimal::ZERO).await;

    let command = transfer_command(alice, bob, Decimal::new(25_00, 2));
    let first = ctx.transfers.transfer(command.clone()).await.unwrap();
    let second = ctx.transfers.transfer(command).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        balance_of(&ctx, alice).await,
        Decimal::new(75_00, 2)
    );
    assert_eq!(
        balance_of(&ctx, bob).await,
        Decimal::new(25_00, 2)
    );
}

#[tokio::test]
async fn test_revert_restores_balances_and_links_transactions() {
    let Some(ctx) = setup().await else { return };

    let alice = funded_account(&ctx, Decimal::new(100_00, 2)).await;
    let bob = funded_account(&ctx, Decimal::ZERO).await;

    let original_id = ctx
        .transfers
        .transfer(transfer_command(alice, bob, Decimal::new(40_00, 2)))
        .await
        .unwrap();

    let reversal_id = ctx
        .reverts
        .revert(RevertCommand {
            transaction_id: original_id,
            reason: Some("fraud investigation".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(
        balance_of(&ctx, alice).await,
        Decimal::new(100_00, 2)
    );
    assert_eq!(balance_of(&ctx, bob).await, Decimal::ZERO);

    let original = transactions::Entity::find_by_id(original_id)
        .one(&ctx.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(original.status, TransactionStatus::Reverted);
    assert_eq!(original.reverted_by_transaction_id, Some(reversal_id));

    let reversal = transactions::Entity::find_by_id(reversal_id)
        .one(&ctx.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reversal.status, TransactionStatus::Completed);
    assert!(
        reversal
            .description
            .starts_with(&format!("REVERSAL of {original_id}"))
    );
    assert!(reversal.description.contains("fraud investigation"));

    // Second revert is rejected.
    let err = ctx
        .reverts
        .revert(RevertCommand {
            transaction_id: original_id,
            reason: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Reversal(tally_core::reversal::ReversalError::AlreadyReverted(_))
    ));
}

#[tokio::test]
async fn test_revert_of_unknown_transaction_is_not_found() {
    let Some(ctx) = setup().await else { return };

    let missing = Uuid::new_v4();
    let err = ctx
        .reverts
        .revert(RevertCommand {
            transaction_id: missing,
            reason: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::TransactionNotFound(id) if id == missing));
}

#[tokio::test]
async fn test_opposing_concurrent_transfers_both_complete() {
    let Some(ctx) = setup().await else { return };

    let alice = funded_account(&ctx, Decimal::new(100_00, 2)).await;
    let bob = funded_account(&ctx, Decimal::new(100_00, 2)).await;

    // Opposite lock-acquisition order without deterministic ordering; this
    // pair must complete rather than deadlock.
    let a_to_b = ctx
        .transfers
        .transfer(transfer_command(alice, bob, Decimal::new(10_00, 2)));
    let b_to_a = ctx
        .transfers
        .transfer(transfer_command(bob, alice, Decimal::new(20_00, 2)));

    let (first, second) = futures::join!(a_to_b, b_to_a);
    first.unwrap();
    second.unwrap();

    assert_eq!(
        balance_of(&ctx, alice).await,
        Decimal::new(110_00, 2)
    );
    assert_eq!(
        balance_of(&ctx, bob).await,
        Decimal::new(90_00, 2)
    );
}

#[tokio::test]
async fn test_statement_lists_entries_newest_first() {
    let Some(ctx) = setup().await else { return };

    let account_id = funded_account(&ctx, Decimal::new(10_00, 2)).await;
    ctx.deposits
        .deposit(account_id, Decimal::new(5_00, 2), Some("second top-up".to_string()))
        .await
        .unwrap();

    let page = ctx
        .accounts
        .statement(account_id, tally_shared::types::PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.meta.total, 2);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].description, "second top-up");
    assert_eq!(page.data[0].entry.balance_snapshot, Decimal::new(15_00, 2));

    let missing = ctx
        .accounts
        .statement(Uuid::new_v4(), tally_shared::types::PageRequest::default())
        .await;
    assert!(matches!(missing, Err(LedgerError::AccountNotFound(_))));
}

#[tokio::test]
async fn test_account_read_is_cached_until_next_mutation() {
    let Some(ctx) = setup().await else { return };

    let account_id = funded_account(&ctx, Decimal::new(10_00, 2)).await;

    // First read warms the cache.
    assert_eq!(balance_of(&ctx, account_id).await, Decimal::new(10_00, 2));

    // A write that bypasses the engines is invisible while the view is warm.
    let row = accounts::Entity::find_by_id(account_id)
        .one(&ctx.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: accounts::ActiveModel = row.into();
    active.balance = Set(Decimal::new(99_00, 2));
    active.update(&ctx.db).await.unwrap();
    assert_eq!(balance_of(&ctx, account_id).await, Decimal::new(10_00, 2));

    // An engine mutation invalidates the view; the next read is fresh.
    ctx.deposits
        .deposit(account_id, Decimal::new(5_00, 2), None)
        .await
        .unwrap();
    assert_eq!(balance_of(&ctx, account_id).await, Decimal::new(104_00, 2));
}

#[tokio::test]
async fn test_claimed_key_with_undecodable_body_is_a_conflict() {
    let Some(ctx) = setup().await else { return };

    let alice = funded_account(&ctx, Decimal::new(100_00, 2)).await;
    let bob = funded_account(&ctx, Decimal::ZERO).await;

    // A claimed key whose stored body cannot be decoded is not replayable,
    // so the retry must surface the claim instead of booking twice.
    let key = Uuid::new_v4().to_string();
    let record = idempotency_keys::ActiveModel {
        key: Set(key.clone()),
        response_status: Set(200),
        response_body: Set(serde_json::json!({"legacy": true})),
        created_at: Set(chrono::Utc::now().into()),
    };
    record.insert(&ctx.db).await.unwrap();

    let mut command = transfer_command(alice, bob, Decimal::new(10_00, 2));
    command.idempotency_key = Some(key.clone());
    let err = ctx.transfers.transfer(command).await.unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateKey(k) if k == key));

    // The rejected unit rolled back; no money moved.
    assert_eq!(balance_of(&ctx, alice).await, Decimal::new(100_00, 2));
    assert_eq!(balance_of(&ctx, bob).await, Decimal::ZERO);
}

#[tokio::test]
async fn test_deposit_lands_on_frozen_account() {
    let Some(ctx) = setup().await else { return };

    let account_id = funded_account(&ctx, Decimal::new(10_00, 2)).await;

    let row = accounts::Entity::find_by_id(account_id)
        .one(&ctx.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: accounts::ActiveModel = row.into();
    active.status = Set(AccountStatus::Frozen);
    active.update(&ctx.db).await.unwrap();

    ctx.deposits
        .deposit(account_id, Decimal::new(5_00, 2), None)
        .await
        .unwrap();
    assert_eq!(balance_of(&ctx, account_id).await, Decimal::new(15_00, 2));
}
