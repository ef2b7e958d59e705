//! Account store and query service for scores.
//!
//! Every read goes straight to committed state; nothing is cached. Balance
//! mutations other than the opening balance happen only in
//! [`crate::executor::TransferExecutor`].

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::{debug, error, info, warn};

use kassa_core::account::{
    AccountError, AccountSnapshot, generate_account_number, validate_close, validate_opening,
};
use kassa_core::transfer::TransferSnapshot;
use kassa_shared::types::{AccountNumber, MinorUnits, UserId};

use crate::entities::{scores, users};

/// How many fresh account numbers to try before giving up.
pub const MAX_NUMBER_ATTEMPTS: u32 = 5;

pub(crate) fn storage_error(err: &DbErr) -> AccountError {
    error!(error = %err, "Account storage failure");
    AccountError::Storage(err.to_string())
}

/// Read-only account lookups the transfer core depends on.
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Returns true if the account row exists, open or closed.
    async fn exists(&self, number: &AccountNumber) -> Result<bool, AccountError>;

    /// Returns true if the account exists and is open.
    async fn is_active(&self, number: &AccountNumber) -> Result<bool, AccountError>;

    /// Returns the balance of an open account.
    ///
    /// Fails with `NotFound` if missing and `Closed` if closed.
    async fn balance(&self, number: &AccountNumber) -> Result<MinorUnits, AccountError>;

    /// Returns the owning user.
    async fn owner_of(&self, number: &AccountNumber) -> Result<UserId, AccountError>;
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an account row by number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_number(
        &self,
        number: &AccountNumber,
    ) -> Result<Option<scores::Model>, AccountError> {
        scores::Entity::find()
            .filter(scores::Column::ScoreNumber.eq(number.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| storage_error(&e))
    }

    async fn require(&self, number: &AccountNumber) -> Result<scores::Model, AccountError> {
        self.find_by_number(number)
            .await?
            .ok_or_else(|| AccountError::NotFound(number.clone()))
    }

    /// Reads both sides of a prospective transfer from committed state.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn transfer_snapshot(
        &self,
        from: &AccountNumber,
        to: &AccountNumber,
    ) -> Result<TransferSnapshot, AccountError> {
        let source = self.find_by_number(from).await?.map(|m| m.snapshot());
        let destination = self.find_by_number(to).await?.map(|m| m.snapshot());
        Ok(TransferSnapshot::new(source, destination))
    }

    /// Opens a new account for `user` with `initial_balance`.
    ///
    /// A random `ACC` number is drawn and retried on collision.
    ///
    /// # Errors
    ///
    /// - `InvalidUser` if the user id is not positive or unknown
    /// - `NegativeOpeningBalance` if the balance is below zero
    /// - `NumberExhausted` if every drawn number was taken
    pub async fn open_account(
        &self,
        user: UserId,
        initial_balance: MinorUnits,
    ) -> Result<scores::Model, AccountError> {
        validate_opening(user, initial_balance)?;

        let owner = users::Entity::find_by_id(user.get())
            .one(&self.db)
            .await
            .map_err(|e| storage_error(&e))?;
        if owner.is_none() {
            return Err(AccountError::InvalidUser(user));
        }

        for attempt in 1..=MAX_NUMBER_ATTEMPTS {
            let number = generate_account_number(&mut rand::rng());
            let row = scores::ActiveModel {
                score_number: Set(number.to_string()),
                user_id: Set(user.get()),
                balance: Set(initial_balance.get()),
                is_active: Set(true),
                created_at: Set(chrono::Utc::now().into()),
                closed_at: Set(None),
                ..Default::default()
            };

            match row.insert(&self.db).await {
                Ok(model) => {
                    info!(
                        score_number = %model.score_number,
                        user_id = %user,
                        balance = model.balance,
                        "Account opened"
                    );
                    return Ok(model);
                }
                Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                    warn!(attempt, score_number = %number, "Account number collision, retrying");
                }
                Err(e) => return Err(storage_error(&e)),
            }
        }

        Err(AccountError::NumberExhausted(MAX_NUMBER_ATTEMPTS))
    }

    /// Closes an account owned by `requester`.
    ///
    /// Takes the same row lock as a transfer, so a close and a transfer on
    /// the same account serialize.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the account does not exist
    /// - `Unauthorized` if the requester does not own it
    /// - `Closed` if it is already closed
    pub async fn close_account(
        &self,
        number: &AccountNumber,
        requester: UserId,
    ) -> Result<scores::Model, AccountError> {
        let txn = self.db.begin().await.map_err(|e| storage_error(&e))?;

        let locked = scores::Entity::find()
            .filter(scores::Column::ScoreNumber.eq(number.as_str()))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| storage_error(&e))?;
        debug!(score_number = %number, "Account row locked for close");

        let Some(model) = locked else {
            txn.rollback().await.map_err(|e| storage_error(&e))?;
            return Err(AccountError::NotFound(number.clone()));
        };

        if let Err(e) = validate_close(&model.snapshot(), requester) {
            txn.rollback().await.map_err(|e| storage_error(&e))?;
            warn!(score_number = %number, user_id = %requester, error = %e, "Close rejected");
            return Err(e);
        }

        let mut active: scores::ActiveModel = model.into();
        active.is_active = Set(false);
        active.closed_at = Set(Some(chrono::Utc::now().into()));
        let closed = active.update(&txn).await.map_err(|e| storage_error(&e))?;

        txn.commit().await.map_err(|e| storage_error(&e))?;
        info!(score_number = %number, user_id = %requester, "Account closed");
        Ok(closed)
    }

    /// Lists the open accounts of `user`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(&self, user: UserId) -> Result<Vec<scores::Model>, AccountError> {
        scores::Entity::find()
            .filter(scores::Column::UserId.eq(user.get()))
            .filter(scores::Column::IsActive.eq(true))
            .order_by_asc(scores::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| storage_error(&e))
    }

    /// Returns the snapshot of an account owned by `user`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the account does not exist
    /// - `Unauthorized` if another user owns it
    pub async fn owned_snapshot(
        &self,
        number: &AccountNumber,
        user: UserId,
    ) -> Result<AccountSnapshot, AccountError> {
        let snapshot = self.require(number).await?.snapshot();
        if !snapshot.is_owned_by(user) {
            return Err(AccountError::Unauthorized {
                account: number.clone(),
                user,
            });
        }
        Ok(snapshot)
    }
}

#[async_trait]
impl AccountQuery for AccountRepository {
    async fn exists(&self, number: &AccountNumber) -> Result<bool, AccountError> {
        Ok(self.find_by_number(number).await?.is_some())
    }

    async fn is_active(&self, number: &AccountNumber) -> Result<bool, AccountError> {
        Ok(self
            .find_by_number(number)
            .await?
            .is_some_and(|m| m.is_active))
    }

    async fn balance(&self, number: &AccountNumber) -> Result<MinorUnits, AccountError> {
        let model = self.require(number).await?;
        if !model.is_active {
            return Err(AccountError::Closed(number.clone()));
        }
        Ok(MinorUnits::new(model.balance))
    }

    async fn owner_of(&self, number: &AccountNumber) -> Result<UserId, AccountError> {
        Ok(UserId(self.require(number).await?.user_id))
    }
}
