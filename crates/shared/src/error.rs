//! Application-wide error types.
//!
//! Every error carries a stable, machine-readable code so that callers can
//! branch on the failure kind without parsing messages.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid credential.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Caller does not own the resource.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        /// Machine-readable code.
        code: &'static str,
        /// Human-readable message.
        message: String,
    },

    /// Malformed request input.
    #[error("Validation error: {message}")]
    Validation {
        /// Machine-readable code.
        code: &'static str,
        /// Human-readable message.
        message: String,
    },

    /// Business rule violation (e.g., insufficient funds).
    #[error("Business rule violation: {message}")]
    BusinessRule {
        /// Machine-readable code.
        code: &'static str,
        /// Human-readable message.
        message: String,
    },

    /// Conflict with existing state.
    #[error("Conflict: {message}")]
    Conflict {
        /// Machine-readable code.
        code: &'static str,
        /// Human-readable message.
        message: String,
    },

    /// Storage failure; the unit of work was rolled back.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound { .. } => 404,
            Self::Validation { .. } => 400,
            Self::BusinessRule { .. } => 422,
            Self::Conflict { .. } => 409,
            Self::Storage(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound { code, .. }
            | Self::Validation { code, .. }
            | Self::BusinessRule { code, .. }
            | Self::Conflict { code, .. } => *code,
            Self::Storage(_) => "storage_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Returns the message shown to API clients.
    ///
    /// Storage and internal details are never exposed.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(m) | Self::Forbidden(m) => m.clone(),
            Self::NotFound { message, .. }
            | Self::Validation { message, .. }
            | Self::BusinessRule { message, .. }
            | Self::Conflict { message, .. } => message.clone(),
            Self::Storage(_) | Self::Internal(_) => "An error occurred".to_string(),
        }
    }

    /// Shorthand for a validation error.
    #[must_use]
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for a not-found error.
    #[must_use]
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for a business rule violation.
    #[must_use]
    pub fn business_rule(code: &'static str, message: impl Into<String>) -> Self {
        Self::BusinessRule {
            code,
            message: message.into(),
        }
    }
}
