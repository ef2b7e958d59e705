//! Caller-facing transfer operations.

use sea_orm::DatabaseConnection;
use tracing::warn;

use kassa_core::account::AccountError;
use kassa_core::transfer::{
    FeasibilityReport, TransferFailure, TransferRecord, TransferRequest, TransferValidator,
};
use kassa_shared::types::{AccountNumber, MinorUnits, UserId};

use crate::executor::{TransferExecutor, storage_failure};
use crate::repositories::account::{AccountQuery, AccountRepository};
use crate::repositories::transfer::TransferRepository;

/// Errors from operations that combine account and transfer checks.
#[derive(Debug, thiserror::Error)]
pub enum TransferServiceError {
    /// Account-level failure such as an ownership mismatch.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Transfer-level failure.
    #[error(transparent)]
    Transfer(#[from] TransferFailure),
}

impl From<TransferServiceError> for kassa_shared::AppError {
    fn from(err: TransferServiceError) -> Self {
        match err {
            TransferServiceError::Account(e) => e.into(),
            TransferServiceError::Transfer(e) => e.into(),
        }
    }
}

/// Transfer operations over the account store, executor, and ledger.
#[derive(Debug, Clone)]
pub struct TransferService {
    accounts: AccountRepository,
    executor: TransferExecutor,
    ledger: TransferRepository,
}

impl TransferService {
    /// Creates the service over one connection pool.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            accounts: AccountRepository::new(db.clone()),
            executor: TransferExecutor::new(db.clone()),
            ledger: TransferRepository::new(db),
        }
    }

    /// Performs a transfer without an ownership check.
    ///
    /// # Errors
    ///
    /// Returns the `TransferFailure` reported by the executor.
    pub async fn perform_transfer(
        &self,
        request: TransferRequest,
    ) -> Result<TransferRecord, TransferFailure> {
        self.executor.execute(request).await
    }

    /// Performs a transfer whose source must be owned by `requester`.
    ///
    /// `InvalidAmount` and `SelfTransfer` are reported ahead of ownership.
    /// A missing source is reported as `SourceNotFound`.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` on an ownership mismatch, otherwise the
    /// executor's failure.
    pub async fn perform_owned_transfer(
        &self,
        requester: UserId,
        request: TransferRequest,
    ) -> Result<TransferRecord, TransferServiceError> {
        TransferValidator::check_request(&request.from, &request.to, request.amount)?;

        match self.accounts.owner_of(&request.from).await {
            Ok(owner) if owner != requester => {
                warn!(from = %request.from, user_id = %requester, "Transfer from foreign account");
                return Err(AccountError::Unauthorized {
                    account: request.from,
                    user: requester,
                }
                .into());
            }
            Ok(_) | Err(AccountError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        Ok(self.executor.execute(request).await?)
    }

    /// Previews a transfer against committed state without applying it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the accounts cannot be read.
    pub async fn check_transfer_feasibility(
        &self,
        from: &AccountNumber,
        to: &AccountNumber,
        amount: MinorUnits,
    ) -> Result<FeasibilityReport, TransferFailure> {
        let snapshot = self
            .accounts
            .transfer_snapshot(from, to)
            .await
            .map_err(|e| TransferFailure::StorageError(e.to_string()))?;
        Ok(FeasibilityReport::evaluate(from, to, amount, &snapshot))
    }

    /// Lists the ledger of an account owned by `requester`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Unauthorized` for the account, or a storage
    /// failure.
    pub async fn history(
        &self,
        number: &AccountNumber,
        requester: UserId,
    ) -> Result<Vec<TransferRecord>, TransferServiceError> {
        let account = self.accounts.owned_snapshot(number, requester).await?;
        self.ledger
            .list_for(account.id)
            .await
            .map_err(|e| TransferServiceError::Transfer(storage_failure(&e)))
    }
}
