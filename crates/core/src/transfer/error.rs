//! Transfer failure taxonomy.

use thiserror::Error;

use kassa_shared::AppError;
use kassa_shared::types::{AccountNumber, MinorUnits};

/// Every way a transfer can fail.
///
/// Validation kinds are reported to the caller verbatim. `StorageError`
/// always means the unit of work was rolled back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferFailure {
    /// Amount is zero or negative.
    #[error("Transfer amount must be positive, got {0}")]
    InvalidAmount(MinorUnits),

    /// Source and destination are the same account.
    #[error("Cannot transfer from account {0} to itself")]
    SelfTransfer(AccountNumber),

    /// Source account does not exist.
    #[error("Source account not found: {0}")]
    SourceNotFound(AccountNumber),

    /// Destination account does not exist.
    #[error("Destination account not found: {0}")]
    DestinationNotFound(AccountNumber),

    /// One of the two accounts is closed.
    #[error("Account {0} is closed")]
    AccountClosed(AccountNumber),

    /// Source balance is below the requested amount.
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Balance of the source account.
        available: MinorUnits,
        /// Requested amount.
        requested: MinorUnits,
    },

    /// Idempotency key is empty or too long.
    #[error("Invalid idempotency key: {0}")]
    InvalidIdempotencyKey(String),

    /// Idempotency key already used for a different transfer.
    #[error("Idempotency key {0} was already used for a different transfer")]
    IdempotencyKeyReused(String),

    /// The store failed; nothing was applied.
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl TransferFailure {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "invalid_amount",
            Self::SelfTransfer(_) => "self_transfer",
            Self::SourceNotFound(_) => "source_not_found",
            Self::DestinationNotFound(_) => "destination_not_found",
            Self::AccountClosed(_) => "account_closed",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::InvalidIdempotencyKey(_) => "invalid_idempotency_key",
            Self::IdempotencyKeyReused(_) => "idempotency_key_reused",
            Self::StorageError(_) => "storage_error",
        }
    }

    /// Returns true for failures caused by the request itself.
    ///
    /// Such failures change nothing and may be retried once the state that
    /// caused them changes.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        !matches!(self, Self::StorageError(_))
    }
}

impl From<TransferFailure> for AppError {
    fn from(err: TransferFailure) -> Self {
        let code = err.code();
        let message = err.to_string();
        match err {
            TransferFailure::InvalidAmount(_)
            | TransferFailure::SelfTransfer(_)
            | TransferFailure::InvalidIdempotencyKey(_) => Self::validation(code, message),
            TransferFailure::SourceNotFound(_) | TransferFailure::DestinationNotFound(_) => {
                Self::not_found(code, message)
            }
            TransferFailure::AccountClosed(_) | TransferFailure::InsufficientFunds { .. } => {
                Self::business_rule(code, message)
            }
            TransferFailure::IdempotencyKeyReused(_) => Self::Conflict { code, message },
            TransferFailure::StorageError(_) => Self::Storage(message),
        }
    }
}
