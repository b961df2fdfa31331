//! Account routes: open, balance, statement, deposit.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{PageMeta, PageRequest};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use tally_db::entities::accounts;

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", post(open_account))
        .route("/accounts/{account_id}/balance", get(get_balance))
        .route("/accounts/{account_id}/statement", get(get_statement))
        .route("/accounts/{account_id}/deposit", post(deposit))
}

/// Request body for opening an account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAccountRequest {
    /// Client owning the account.
    pub client_id: String,
    /// ISO 4217 currency code.
    pub currency: String,
}

/// Response for an account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Client owning the account.
    pub client_id: String,
    /// Currency code.
    pub currency: String,
    /// Current balance.
    pub balance: Decimal,
    /// Account status.
    pub status: String,
}

impl From<accounts::Model> for AccountResponse {
    fn from(account: accounts::Model) -> Self {
        let status = tally_core::ledger::AccountStatus::from(account.status).to_string();
        Self {
            id: account.id,
            client_id: account.client_id,
            currency: account.currency,
            balance: account.balance,
            status,
        }
    }
}

/// POST `/accounts` - Get-or-create an account for (client, currency).
async fn open_account(
    State(state): State<AppState>,
    Json(payload): Json<OpenAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let opened = state
        .accounts
        .open(&payload.client_id, &payload.currency)
        .await?;

    let status = if opened.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(AccountResponse::from(opened.account))))
}

/// GET `/accounts/{account_id}/balance` - Current balance view.
async fn get_balance(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let account = state.accounts.get(account_id).await?;
    Ok(Json(AccountResponse::from(account)))
}

/// Query parameters for the statement endpoint.
#[derive(Debug, Deserialize)]
pub struct StatementQuery {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Entries per page.
    pub limit: Option<u32>,
}

/// One statement line in the response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementLineResponse {
    /// Entry ID.
    pub id: Uuid,
    /// Transaction the entry belongs to.
    pub transaction_id: Uuid,
    /// Transaction description.
    pub description: String,
    /// DEBIT or CREDIT.
    pub operation: String,
    /// Amount moved.
    pub amount: Decimal,
    /// Account balance after this entry.
    pub balance_snapshot: Decimal,
    /// Entry timestamp (RFC 3339).
    pub created_at: String,
}

/// Paginated statement response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementResponse {
    /// Statement lines, newest first.
    pub data: Vec<StatementLineResponse>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// GET `/accounts/{account_id}/statement` - Paginated ledger history.
async fn get_statement(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Query(query): Query<StatementQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let defaults = PageRequest::default();
    let page = PageRequest {
        page: query.page.unwrap_or(defaults.page).max(1),
        per_page: query.limit.unwrap_or(defaults.per_page).clamp(1, 100),
    };

    let result = state.accounts.statement(account_id, page).await?;
    let data = result
        .data
        .into_iter()
        .map(|line| StatementLineResponse {
            id: line.entry.id,
            transaction_id: line.entry.transaction_id,
            description: line.description,
            operation: tally_core::ledger::OperationType::from(line.entry.operation_type)
                .to_string(),
            amount: line.entry.amount,
            balance_snapshot: line.entry.balance_snapshot,
            created_at: line.entry.created_at.to_rfc3339(),
        })
        .collect();

    Ok(Json(StatementResponse {
        data,
        meta: result.meta,
    }))
}

/// Request body for a deposit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    /// Amount to credit.
    pub amount: Decimal,
    /// Optional statement description.
    pub description: Option<String>,
}

/// Response for a booked deposit.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositResponse {
    /// The booked transaction.
    pub transaction_id: Uuid,
}

/// POST `/accounts/{account_id}/deposit` - Credit external funds.
async fn deposit(
    State(state): State<AppState>,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<DepositRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let transaction_id = state
        .deposits
        .deposit(account_id, payload.amount, payload.description)
        .await?;
    Ok(Json(DepositResponse { transaction_id }))
}
