//! Transaction administration routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tally_core::reversal::RevertCommand;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/transactions/{transaction_id}/revert", post(revert))
}

/// Request body for a reversal.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevertRequest {
    /// Optional operator-supplied reason for the audit trail.
    pub reason: Option<String>,
}

/// Response for a booked reversal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevertResponse {
    /// The reverted transaction.
    pub original_transaction_id: Uuid,
    /// The compensating transaction booked by the reversal.
    pub reversal_transaction_id: Uuid,
}

/// POST `/transactions/{transaction_id}/revert` - Undo a booked transaction.
async fn revert(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
    payload: Option<Json<RevertRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let reason = payload.and_then(|Json(body)| body.reason);

    let reversal_transaction_id = state
        .reverts
        .revert(RevertCommand {
            transaction_id,
            reason,
        })
        .await?;

    Ok(Json(RevertResponse {
        original_transaction_id: transaction_id,
        reversal_transaction_id,
    }))
}
