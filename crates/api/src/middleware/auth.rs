//! Authentication middleware for protected routes.
//!
//! A valid bearer token only proves the external user id; the middleware
//! then resolves it to the internal numeric id handlers work with.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, warn};

use crate::AppState;
use crate::error::ApiError;
use kassa_db::{UserError, UserRepository};
use kassa_shared::JwtError;
use kassa_shared::types::{UserId, UserUuid};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

fn unauthorized(error: &str, message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": error, "message": message })),
    )
        .into_response()
}

/// Authentication middleware that validates JWT tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Resolves the token subject to an internal user id
/// 4. Stores the identity in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return unauthorized(
            "missing_token",
            "Authorization header with Bearer token is required",
        );
    };

    let claims = match state.jwt_service.validate_token(token) {
        Ok(claims) => claims,
        Err(JwtError::Expired) => return unauthorized("token_expired", "Token has expired"),
        Err(e) => {
            debug!(error = %e, "Token rejected");
            return unauthorized("invalid_token", "Invalid or malformed token");
        }
    };

    let uuid = claims.subject();
    let users = UserRepository::new((*state.db).clone());
    match users.resolve_internal_id(uuid).await {
        Ok(id) => {
            request.extensions_mut().insert(AuthUser { uuid, id });
            next.run(request).await
        }
        Err(UserError::NotFound(_)) => {
            warn!(uuid = %uuid, "Token subject has no user row");
            unauthorized("unknown_user", "User not found")
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// The authenticated caller.
///
/// Use this in handlers to get the caller's identity:
///
/// ```ignore
/// async fn handler(user: AuthUser) -> impl IntoResponse {
///     let owner = user.id;
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// External id from the token subject.
    pub uuid: UserUuid,
    /// Internal numeric id.
    pub id: UserId,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().copied().ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "unauthorized",
                    "message": "Authentication required"
                })),
            )
        })
    }
}
