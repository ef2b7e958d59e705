//! Account error types.

use thiserror::Error;

use kassa_shared::AppError;
use kassa_shared::types::{AccountNumber, MinorUnits, UserId};

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// No account with this number exists.
    #[error("Account not found: {0}")]
    NotFound(AccountNumber),

    /// The account exists but is closed.
    #[error("Account {0} is closed")]
    Closed(AccountNumber),

    /// The requesting user does not own the account.
    #[error("Account {account} does not belong to user {user}")]
    Unauthorized {
        /// The account that was addressed.
        account: AccountNumber,
        /// The user that asked.
        user: UserId,
    },

    /// User id is missing or not positive.
    #[error("Invalid user id: {0}")]
    InvalidUser(UserId),

    /// Opening balance below zero.
    #[error("Opening balance cannot be negative: {0}")]
    NegativeOpeningBalance(MinorUnits),

    /// Could not find a free account number.
    #[error("Could not allocate a unique account number after {0} attempts")]
    NumberExhausted(u32),

    /// Storage failure.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        let message = err.to_string();
        match err {
            AccountError::NotFound(_) => Self::not_found("account_not_found", message),
            AccountError::Closed(_) => Self::business_rule("account_closed", message),
            AccountError::Unauthorized { .. } => {
                Self::Forbidden("Account does not belong to the caller".to_string())
            }
            AccountError::InvalidUser(_) => Self::validation("invalid_user", message),
            AccountError::NegativeOpeningBalance(_) => {
                Self::validation("invalid_initial_balance", message)
            }
            AccountError::NumberExhausted(_) | AccountError::Storage(_) => Self::Storage(message),
        }
    }
}
