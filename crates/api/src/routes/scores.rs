//! Score (account) routes: open, list, close, history.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::error::ApiResult;
use crate::{AppState, middleware::AuthUser, routes::transfers::TransferResponse};
use kassa_db::entities::scores;
use kassa_db::{AccountRepository, TransferService};
use kassa_shared::AppError;
use kassa_shared::types::{AccountNumber, MinorUnits};

/// Creates the score routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/scores", get(list_scores))
        .route("/scores/open", post(open_score))
        .route("/scores/close", post(close_score))
        .route("/scores/{score_number}/transfers", get(score_history))
}

/// Request body for opening a score.
#[derive(Debug, Deserialize)]
pub struct OpenScoreRequest {
    /// Opening balance in minor units; must be positive.
    pub initial_balance: MinorUnits,
}

/// Request body for closing a score.
#[derive(Debug, Deserialize)]
pub struct CloseScoreRequest {
    /// Number of the score to close.
    pub score_number: AccountNumber,
}

/// Response for a score.
#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    /// Score number.
    pub score_number: String,
    /// Current balance in minor units.
    pub balance: i64,
    /// Whether the score is open.
    pub is_active: bool,
    /// Opening timestamp.
    pub created_at: String,
    /// Closing timestamp.
    pub closed_at: Option<String>,
}

impl From<scores::Model> for ScoreResponse {
    fn from(model: scores::Model) -> Self {
        Self {
            score_number: model.score_number,
            balance: model.balance,
            is_active: model.is_active,
            created_at: model.created_at.to_rfc3339(),
            closed_at: model.closed_at.map(|t| t.to_rfc3339()),
        }
    }
}

pub(crate) fn require_number(number: &AccountNumber, field: &str) -> Result<(), AppError> {
    if number.is_empty() {
        return Err(AppError::validation(
            "invalid_score_number",
            format!("{field} is required"),
        ));
    }
    Ok(())
}

/// POST `/scores/open` - Open a score for the caller.
async fn open_score(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<OpenScoreRequest>,
) -> ApiResult<impl IntoResponse> {
    // A new score must start funded
    if !payload.initial_balance.is_positive() {
        return Err(AppError::validation(
            "invalid_initial_balance",
            "Initial balance must be positive",
        )
        .into());
    }

    let repo = AccountRepository::new((*state.db).clone());
    let model = repo.open_account(auth.id, payload.initial_balance).await?;
    info!(user = %auth.uuid, score_number = %model.score_number, "Score opened via API");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "score_number": model.score_number,
            "balance": model.balance,
        })),
    ))
}

/// GET `/scores` - List the caller's open scores.
async fn list_scores(State(state): State<AppState>, auth: AuthUser) -> ApiResult<impl IntoResponse> {
    let repo = AccountRepository::new((*state.db).clone());
    let scores: Vec<ScoreResponse> = repo
        .list_accounts(auth.id)
        .await?
        .into_iter()
        .map(ScoreResponse::from)
        .collect();

    Ok(Json(json!({ "scores": scores })))
}

/// POST `/scores/close` - Close one of the caller's scores.
async fn close_score(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CloseScoreRequest>,
) -> ApiResult<impl IntoResponse> {
    require_number(&payload.score_number, "score_number")?;

    let repo = AccountRepository::new((*state.db).clone());
    let model = repo.close_account(&payload.score_number, auth.id).await?;

    Ok(Json(ScoreResponse::from(model)))
}

/// GET `/scores/{score_number}/transfers` - Ledger of one of the caller's scores.
async fn score_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(score_number): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let number = AccountNumber::new(score_number);
    require_number(&number, "score_number")?;

    let service = TransferService::new((*state.db).clone());
    let transfers: Vec<TransferResponse> = service
        .history(&number, auth.id)
        .await?
        .into_iter()
        .map(TransferResponse::from)
        .collect();

    Ok(Json(json!({ "score_number": number, "transfers": transfers })))
}
