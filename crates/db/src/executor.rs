//! Atomic transfer execution.
//!
//! One transfer is one database transaction: lock both account rows in
//! ascending account-number order, re-read them under the lock, validate,
//! debit, credit, append the ledger record, commit. Any failure rolls the
//! whole unit back.
//!
//! Once the transaction has begun the unit runs on its own task, so dropping
//! the caller's future does not abandon a half-applied transfer.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::{debug, error, info, instrument, warn};

use kassa_core::transfer::{
    IdempotencyKey, TransferFailure, TransferRecord, TransferRequest, TransferSnapshot,
    TransferStatus, TransferValidator,
};
use kassa_shared::types::{AccountNumber, TransferId};

use crate::entities::scores;
use crate::repositories::transfer::{NewTransfer, TransferRepository};

/// Collapses a storage failure into the transfer taxonomy.
pub(crate) fn storage_failure(err: &DbErr) -> TransferFailure {
    error!(error = %err, "Transfer storage failure");
    TransferFailure::StorageError(err.to_string())
}

/// Why a unit of work stopped before commit.
#[derive(Debug)]
enum Abort {
    /// A business check failed.
    Rejected(TransferFailure),
    /// Another unit inserted the same idempotency key first.
    KeyRace(IdempotencyKey),
    /// The store failed.
    Storage(DbErr),
}

impl From<DbErr> for Abort {
    fn from(err: DbErr) -> Self {
        Self::Storage(err)
    }
}

/// What a committed-or-replayed unit produced.
enum Applied {
    /// A new transfer was written.
    New(TransferRecord),
    /// The idempotency key matched a stored transfer; nothing was written.
    Replayed(TransferRecord),
}

/// Applies transfers atomically.
#[derive(Debug, Clone)]
pub struct TransferExecutor {
    db: DatabaseConnection,
}

impl TransferExecutor {
    /// Creates a new executor.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Executes `request` as a single atomic unit.
    ///
    /// # Errors
    ///
    /// Returns the first failing validation check, `IdempotencyKeyReused`
    /// when the key belongs to a different transfer, or `StorageError` when
    /// the store fails. In every error case nothing was applied.
    #[instrument(
        skip(self, request),
        fields(from = %request.from, to = %request.to, amount = %request.amount)
    )]
    pub async fn execute(&self, request: TransferRequest) -> Result<TransferRecord, TransferFailure> {
        // Malformed requests never take a lock
        if let Err(failure) =
            TransferValidator::check_request(&request.from, &request.to, request.amount)
        {
            warn!(code = failure.code(), "Transfer rejected before locking");
            return Err(failure);
        }

        let txn = self.db.begin().await.map_err(|e| storage_failure(&e))?;
        let db = self.db.clone();

        let unit = tokio::spawn(run_unit(db, txn, request));
        match unit.await {
            Ok(result) => result,
            Err(join_err) => {
                error!(error = %join_err, "Transfer task failed");
                Err(TransferFailure::StorageError(join_err.to_string()))
            }
        }
    }
}

async fn run_unit(
    db: DatabaseConnection,
    txn: DatabaseTransaction,
    request: TransferRequest,
) -> Result<TransferRecord, TransferFailure> {
    let outcome = apply(&txn, &request).await;
    match outcome {
        Ok(Applied::New(record)) => {
            txn.commit().await.map_err(|e| storage_failure(&e))?;
            info!(
                transfer_id = %record.id,
                from = %record.from_number,
                to = %record.to_number,
                amount = %record.amount,
                "Transfer completed"
            );
            Ok(record)
        }
        Ok(Applied::Replayed(record)) => {
            rollback(txn).await;
            info!(transfer_id = %record.id, "Transfer replayed from idempotency key");
            Ok(record)
        }
        Err(Abort::Rejected(failure)) => {
            rollback(txn).await;
            warn!(code = failure.code(), error = %failure, "Transfer rejected");
            Err(failure)
        }
        Err(Abort::KeyRace(key)) => {
            rollback(txn).await;
            debug!(idempotency_key = %key, "Idempotency key inserted concurrently, re-reading");
            let existing = TransferRepository::find_by_idempotency_key(&db, &key)
                .await
                .map_err(|e| storage_failure(&e))?;
            match existing {
                Some(record) if record.matches_request(&request) => Ok(record),
                Some(_) => Err(TransferFailure::IdempotencyKeyReused(key.to_string())),
                None => Err(TransferFailure::StorageError(format!(
                    "idempotency key {key} conflicted but no record was found"
                ))),
            }
        }
        Err(Abort::Storage(err)) => {
            rollback(txn).await;
            Err(storage_failure(&err))
        }
    }
}

async fn rollback(txn: DatabaseTransaction) {
    if let Err(e) = txn.rollback().await {
        error!(error = %e, "Transfer rollback failed");
    }
}

async fn lock_account(
    txn: &DatabaseTransaction,
    number: &AccountNumber,
) -> Result<Option<scores::Model>, DbErr> {
    let row = scores::Entity::find()
        .filter(scores::Column::ScoreNumber.eq(number.as_str()))
        .lock_exclusive()
        .one(txn)
        .await?;
    debug!(score_number = %number, found = row.is_some(), "Account row locked");
    Ok(row)
}

async fn apply(txn: &DatabaseTransaction, request: &TransferRequest) -> Result<Applied, Abort> {
    // Ascending account-number order, so two opposite transfers cannot deadlock
    let from_first = request.from < request.to;
    let (first, second) = if from_first {
        (&request.from, &request.to)
    } else {
        (&request.to, &request.from)
    };
    let first_row = lock_account(txn, first).await?;
    let second_row = lock_account(txn, second).await?;
    let (source, destination) = if from_first {
        (first_row, second_row)
    } else {
        (second_row, first_row)
    };

    // A replay must return the stored record even if the balances moved since
    if let Some(key) = &request.idempotency_key {
        if let Some(existing) = TransferRepository::find_by_idempotency_key(txn, key).await? {
            if existing.matches_request(request) {
                return Ok(Applied::Replayed(existing));
            }
            return Err(Abort::Rejected(TransferFailure::IdempotencyKeyReused(
                key.to_string(),
            )));
        }
    }

    let snapshot = TransferSnapshot::new(
        source.as_ref().map(scores::Model::snapshot),
        destination.as_ref().map(scores::Model::snapshot),
    );
    let plan = TransferValidator::validate(&request.from, &request.to, request.amount, &snapshot)
        .map_err(Abort::Rejected)?;

    scores::ActiveModel {
        id: Set(plan.source.get()),
        balance: Set(plan.source_balance_after.get()),
        ..Default::default()
    }
    .update(txn)
    .await?;
    scores::ActiveModel {
        id: Set(plan.destination.get()),
        balance: Set(plan.destination_balance_after.get()),
        ..Default::default()
    }
    .update(txn)
    .await?;

    let appended = TransferRepository::append(
        txn,
        NewTransfer {
            from_account: plan.source,
            to_account: plan.destination,
            amount: plan.amount,
            idempotency_key: request.idempotency_key.clone(),
        },
    )
    .await;

    let model = match appended {
        Ok(model) => model,
        Err(e) => {
            if let (Some(key), Some(SqlErr::UniqueConstraintViolation(_))) =
                (&request.idempotency_key, e.sql_err())
            {
                return Err(Abort::KeyRace(key.clone()));
            }
            return Err(Abort::Storage(e));
        }
    };

    Ok(Applied::New(TransferRecord {
        id: TransferId::from_uuid(model.transfer_uuid),
        from_account: plan.source,
        to_account: plan.destination,
        from_number: request.from.clone(),
        to_number: request.to.clone(),
        amount: plan.amount,
        status: TransferStatus::from(model.status),
        idempotency_key: model.idempotency_key,
        created_at: model.created_at.with_timezone(&chrono::Utc),
        completed_at: model.completed_at.map(|t| t.with_timezone(&chrono::Utc)),
    }))
}
