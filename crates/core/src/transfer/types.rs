//! Transfer records and request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kassa_shared::types::{AccountId, AccountNumber, MinorUnits, TransferId};

use super::error::TransferFailure;

/// Maximum length of an idempotency key, in characters.
pub const IDEMPOTENCY_KEY_MAX_LEN: usize = 64;

/// Lifecycle status of a transfer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    /// Reserved for asynchronous execution; never written today.
    Pending,
    /// Applied and committed.
    Success,
    /// Reserved; failed transfers are reported, not stored.
    Failed,
}

impl TransferStatus {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied replay key for a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Parses a key: 1 to 64 characters, not blank.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdempotencyKey` if the key is blank or too long.
    pub fn parse(value: impl Into<String>) -> Result<Self, TransferFailure> {
        let value: String = value.into();
        if value.trim().is_empty() {
            return Err(TransferFailure::InvalidIdempotencyKey(
                "key must not be empty".to_string(),
            ));
        }
        if value.chars().count() > IDEMPOTENCY_KEY_MAX_LEN {
            return Err(TransferFailure::InvalidIdempotencyKey(format!(
                "key must be at most {IDEMPOTENCY_KEY_MAX_LEN} characters"
            )));
        }
        Ok(Self(value))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A request to move funds between two accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Account to debit.
    pub from: AccountNumber,
    /// Account to credit.
    pub to: AccountNumber,
    /// Amount in minor units.
    pub amount: MinorUnits,
    /// Optional replay key.
    pub idempotency_key: Option<IdempotencyKey>,
}

impl TransferRequest {
    /// Creates a request without an idempotency key.
    #[must_use]
    pub fn new(from: AccountNumber, to: AccountNumber, amount: MinorUnits) -> Self {
        Self {
            from,
            to,
            amount,
            idempotency_key: None,
        }
    }

    /// Attaches an idempotency key.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: IdempotencyKey) -> Self {
        self.idempotency_key = Some(key);
        self
    }
}

/// A completed transfer as stored in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Unique transfer identifier, generated at execution time.
    pub id: TransferId,
    /// Internal id of the debited account.
    pub from_account: AccountId,
    /// Internal id of the credited account.
    pub to_account: AccountId,
    /// Number of the debited account.
    pub from_number: AccountNumber,
    /// Number of the credited account.
    pub to_number: AccountNumber,
    /// Amount moved.
    pub amount: MinorUnits,
    /// Record status.
    pub status: TransferStatus,
    /// Replay key supplied with the request, if any.
    pub idempotency_key: Option<String>,
    /// When the transfer was created.
    pub created_at: DateTime<Utc>,
    /// When the transfer completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl TransferRecord {
    /// Returns true if replaying `request` against this record is a no-op.
    #[must_use]
    pub fn matches_request(&self, request: &TransferRequest) -> bool {
        self.from_number == request.from
            && self.to_number == request.to
            && self.amount == request.amount
    }

    /// Returns true if `account` is the source or destination.
    #[must_use]
    pub fn involves(&self, account: AccountId) -> bool {
        self.from_account == account || self.to_account == account
    }
}
