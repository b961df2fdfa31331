//! Transfer route.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::transfer::TransferCommand;
use tally_shared::AppError;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

/// Creates the transfer routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/transfers", post(create_transfer))
}

/// Request body for a transfer.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Account to debit.
    pub from_account_id: Uuid,
    /// Account to credit.
    pub to_account_id: Uuid,
    /// Amount to move.
    pub amount: Decimal,
    /// Statement description.
    pub description: String,
}

/// Response for a booked transfer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    /// The booked (or replayed) transaction.
    pub transaction_id: Uuid,
}

/// POST `/transfers` - Book a transfer.
///
/// The optional `Idempotency-Key` header makes retries safe: a replayed
/// request returns the original transaction id.
async fn create_transfer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<TransferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let idempotency_key = match headers.get("Idempotency-Key") {
        Some(value) => {
            let key = value.to_str().map_err(|_| {
                ApiError(AppError::Validation(
                    "Idempotency-Key header must be visible ASCII".to_string(),
                ))
            })?;
            Some(key.to_string())
        }
        None => None,
    };

    let transaction_id = state
        .transfers
        .transfer(TransferCommand {
            from_account_id: payload.from_account_id,
            to_account_id: payload.to_account_id,
            amount: payload.amount,
            description: payload.description,
            idempotency_key,
        })
        .await?;

    Ok(Json(TransferResponse { transaction_id }))
}
