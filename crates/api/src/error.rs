//! JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use kassa_shared::AppError;

/// Error returned by handlers, rendered as `{"error": code, "message": ...}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": self.0.public_message(),
            })),
        )
            .into_response()
    }
}

/// Handler result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use kassa_core::transfer::TransferFailure;
    use kassa_shared::types::{AccountNumber, MinorUnits};
    use rstest::rstest;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[rstest]
    #[case(TransferFailure::InvalidAmount(MinorUnits::new(-1)), StatusCode::BAD_REQUEST, "invalid_amount")]
    #[case(TransferFailure::SelfTransfer(AccountNumber::from("ACC000001")), StatusCode::BAD_REQUEST, "self_transfer")]
    #[case(TransferFailure::SourceNotFound(AccountNumber::from("ACC000001")), StatusCode::NOT_FOUND, "source_not_found")]
    #[case(TransferFailure::AccountClosed(AccountNumber::from("ACC000001")), StatusCode::UNPROCESSABLE_ENTITY, "account_closed")]
    #[case(
        TransferFailure::InsufficientFunds { available: MinorUnits::ZERO, requested: MinorUnits::new(1) },
        StatusCode::UNPROCESSABLE_ENTITY,
        "insufficient_funds"
    )]
    #[case(TransferFailure::IdempotencyKeyReused("k".into()), StatusCode::CONFLICT, "idempotency_key_reused")]
    #[tokio::test]
    async fn test_failure_response(
        #[case] failure: TransferFailure,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let response = ApiError::from(failure).into_response();
        assert_eq!(response.status(), status);
        let body = body_json(response).await;
        assert_eq!(body["error"], code);
    }

    #[tokio::test]
    async fn test_storage_details_are_hidden() {
        let response =
            ApiError::from(TransferFailure::StorageError("disk on fire".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "storage_error");
        assert_eq!(body["message"], "An error occurred");
    }
}
