//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for accounts, transfers, and reversals
//! - Error-to-status mapping via the shared `AppError` taxonomy

pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sea_orm::DatabaseConnection;
use tally_db::repositories::{
    AccountRepository, DepositEngine, IdempotencyCache, ReadCache, RevertEngine, TransferEngine,
};
use tally_shared::AppConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Account reads and get-or-create.
    pub accounts: AccountRepository,
    /// Transfer booking engine.
    pub transfers: TransferEngine,
    /// Deposit booking engine.
    pub deposits: DepositEngine,
    /// Reversal engine.
    pub reverts: RevertEngine,
}

impl AppState {
    /// Wires the engines over one connection pool and shared caches.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: &AppConfig) -> Self {
        let ttl = Duration::from_secs(config.idempotency.cache_ttl_secs);
        let read_cache = ReadCache::new(config.idempotency.cache_capacity, ttl);
        let idempotency = IdempotencyCache::new(config.idempotency.cache_capacity, ttl);

        let transfers = TransferEngine::new(
            db.clone(),
            idempotency,
            read_cache.clone(),
            config.database.lock_timeout_ms,
        );

        Self {
            accounts: AccountRepository::new(db.clone(), read_cache.clone()),
            deposits: DepositEngine::new(db.clone(), read_cache, config.database.lock_timeout_ms),
            reverts: RevertEngine::new(transfers.clone()),
            transfers,
            db: Arc::new(db),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .merge(routes::health::routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
