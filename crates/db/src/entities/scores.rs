//! `SeaORM` Entity for scores table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use kassa_core::account::AccountSnapshot;
use kassa_shared::types::{AccountId, AccountNumber, MinorUnits, UserId};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "scores")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub score_number: String,
    pub user_id: i64,
    pub balance: i64,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub closed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Returns the domain view of this row.
    #[must_use]
    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            id: AccountId(self.id),
            number: AccountNumber::new(self.score_number.clone()),
            owner: UserId(self.user_id),
            balance: MinorUnits::new(self.balance),
            active: self.is_active,
        }
    }
}
