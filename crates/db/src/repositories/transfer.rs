//! Transfer ledger: append-only record of completed transfers.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use kassa_core::transfer::{IdempotencyKey, TransferRecord, TransferStatus as DomainStatus};
use kassa_shared::types::{AccountId, AccountNumber, MinorUnits, TransferId};

use crate::entities::{scores, sea_orm_active_enums::TransferStatus, transfers};

/// A transfer about to be appended.
#[derive(Debug, Clone)]
pub struct NewTransfer {
    /// Debited account.
    pub from_account: AccountId,
    /// Credited account.
    pub to_account: AccountId,
    /// Amount moved.
    pub amount: MinorUnits,
    /// Replay key supplied with the request.
    pub idempotency_key: Option<IdempotencyKey>,
}

/// Transfer ledger repository.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    db: DatabaseConnection,
}

impl TransferRepository {
    /// Creates a new transfer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends a SUCCESS record on `conn`, normally the executor's transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails; the caller must abort the unit.
    pub async fn append<C: ConnectionTrait>(
        conn: &C,
        transfer: NewTransfer,
    ) -> Result<transfers::Model, DbErr> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
        transfers::ActiveModel {
            transfer_uuid: Set(TransferId::new().into_inner()),
            from_score_id: Set(transfer.from_account.get()),
            to_score_id: Set(transfer.to_account.get()),
            amount: Set(transfer.amount.get()),
            status: Set(TransferStatus::Success),
            idempotency_key: Set(transfer.idempotency_key.map(|k| k.as_str().to_string())),
            created_at: Set(now),
            completed_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(conn)
        .await
    }

    /// Finds the record stored under an idempotency key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_idempotency_key<C: ConnectionTrait>(
        conn: &C,
        key: &IdempotencyKey,
    ) -> Result<Option<TransferRecord>, DbErr> {
        let model = transfers::Entity::find()
            .filter(transfers::Column::IdempotencyKey.eq(key.as_str()))
            .one(conn)
            .await?;

        match model {
            Some(model) => Ok(hydrate(conn, vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Finds a transfer by its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: TransferId) -> Result<Option<TransferRecord>, DbErr> {
        let model = transfers::Entity::find()
            .filter(transfers::Column::TransferUuid.eq(id.into_inner()))
            .one(&self.db)
            .await?;

        match model {
            Some(model) => Ok(hydrate(&self.db, vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Lists transfers where `account` is source or destination, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for(&self, account: AccountId) -> Result<Vec<TransferRecord>, DbErr> {
        let models = transfers::Entity::find()
            .filter(
                Condition::any()
                    .add(transfers::Column::FromScoreId.eq(account.get()))
                    .add(transfers::Column::ToScoreId.eq(account.get())),
            )
            .order_by_asc(transfers::Column::CreatedAt)
            .order_by_asc(transfers::Column::Id)
            .all(&self.db)
            .await?;

        hydrate(&self.db, models).await
    }

    /// Counts every stored transfer.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self) -> Result<u64, DbErr> {
        transfers::Entity::find().count(&self.db).await
    }
}

/// Attaches account numbers to ledger rows.
pub(crate) async fn hydrate<C: ConnectionTrait>(
    conn: &C,
    models: Vec<transfers::Model>,
) -> Result<Vec<TransferRecord>, DbErr> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let mut ids: Vec<i64> = models
        .iter()
        .flat_map(|m| [m.from_score_id, m.to_score_id])
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let numbers: HashMap<i64, String> = scores::Entity::find()
        .filter(scores::Column::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|s| (s.id, s.score_number))
        .collect();

    models
        .into_iter()
        .map(|m| {
            let lookup = |id: i64| {
                numbers
                    .get(&id)
                    .map(|n| AccountNumber::new(n.clone()))
                    .ok_or_else(|| DbErr::RecordNotFound(format!("score {id} referenced by transfer")))
            };
            Ok(TransferRecord {
                id: TransferId::from_uuid(m.transfer_uuid),
                from_account: AccountId(m.from_score_id),
                to_account: AccountId(m.to_score_id),
                from_number: lookup(m.from_score_id)?,
                to_number: lookup(m.to_score_id)?,
                amount: MinorUnits::new(m.amount),
                status: DomainStatus::from(m.status),
                idempotency_key: m.idempotency_key,
                created_at: m.created_at.with_timezone(&chrono::Utc),
                completed_at: m.completed_at.map(|t| t.with_timezone(&chrono::Utc)),
            })
        })
        .collect()
}
