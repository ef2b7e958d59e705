//! `SeaORM` Entity for transfers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TransferStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub transfer_uuid: Uuid,
    pub from_score_id: i64,
    pub to_score_id: i64,
    pub amount: i64,
    pub status: TransferStatus,
    #[sea_orm(unique)]
    pub idempotency_key: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub completed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::scores::Entity",
        from = "Column::FromScoreId",
        to = "super::scores::Column::Id"
    )]
    FromScore,
    #[sea_orm(
        belongs_to = "super::scores::Entity",
        from = "Column::ToScoreId",
        to = "super::scores::Column::Id"
    )]
    ToScore,
}

impl ActiveModelBehavior for ActiveModel {}
