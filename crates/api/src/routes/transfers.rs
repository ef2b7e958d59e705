//! Transfer routes: perform and feasibility check.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiResult;
use crate::routes::scores::require_number;
use crate::{AppState, middleware::AuthUser};
use kassa_core::transfer::{IdempotencyKey, TransferRecord, TransferRequest};
use kassa_db::TransferService;
use kassa_shared::types::{AccountNumber, MinorUnits};

/// Creates the transfer routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transfers/perform", post(perform_transfer))
        .route("/transfers/check", post(check_transfer))
}

/// Request body for performing a transfer.
#[derive(Debug, Deserialize)]
pub struct PerformTransferRequest {
    /// Score to debit; must belong to the caller.
    pub from_score_number: AccountNumber,
    /// Score to credit.
    pub to_score_number: AccountNumber,
    /// Amount in minor units.
    pub amount: MinorUnits,
    /// Optional replay key.
    pub idempotency_key: Option<String>,
}

/// Request body for a feasibility check.
#[derive(Debug, Deserialize)]
pub struct CheckTransferRequest {
    /// Score to debit.
    pub from_score_number: AccountNumber,
    /// Score to credit.
    pub to_score_number: AccountNumber,
    /// Amount in minor units.
    pub amount: MinorUnits,
}

/// Response for a stored transfer.
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    /// Transfer identifier.
    pub transfer_id: String,
    /// Debited score.
    pub from_score_number: String,
    /// Credited score.
    pub to_score_number: String,
    /// Amount in minor units.
    pub amount: i64,
    /// Record status.
    pub status: String,
    /// Replay key, if one was supplied.
    pub idempotency_key: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
    /// Completion timestamp.
    pub completed_at: Option<String>,
}

impl From<TransferRecord> for TransferResponse {
    fn from(record: TransferRecord) -> Self {
        Self {
            transfer_id: record.id.to_string(),
            from_score_number: record.from_number.to_string(),
            to_score_number: record.to_number.to_string(),
            amount: record.amount.get(),
            status: record.status.to_string(),
            idempotency_key: record.idempotency_key,
            created_at: record.created_at.to_rfc3339(),
            completed_at: record.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// POST `/transfers/perform` - Move funds from one of the caller's scores.
async fn perform_transfer(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PerformTransferRequest>,
) -> ApiResult<impl IntoResponse> {
    require_number(&payload.from_score_number, "from_score_number")?;
    require_number(&payload.to_score_number, "to_score_number")?;

    let mut request = TransferRequest::new(
        payload.from_score_number,
        payload.to_score_number,
        payload.amount,
    );
    if let Some(key) = payload.idempotency_key {
        request = request.with_idempotency_key(IdempotencyKey::parse(key)?);
    }

    let service = TransferService::new((*state.db).clone());
    let record = service.perform_owned_transfer(auth.id, request).await?;
    info!(user = %auth.uuid, transfer_id = %record.id, "Transfer performed via API");

    Ok(Json(TransferResponse::from(record)))
}

/// POST `/transfers/check` - Preview a transfer without applying it.
async fn check_transfer(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(payload): Json<CheckTransferRequest>,
) -> ApiResult<impl IntoResponse> {
    require_number(&payload.from_score_number, "from_score_number")?;
    require_number(&payload.to_score_number, "to_score_number")?;

    let service = TransferService::new((*state.db).clone());
    let report = service
        .check_transfer_feasibility(
            &payload.from_score_number,
            &payload.to_score_number,
            payload.amount,
        )
        .await?;

    Ok(Json(report))
}
