//! `SeaORM` entity definitions.

pub mod prelude;

pub mod scores;
pub mod sea_orm_active_enums;
pub mod transfers;
pub mod users;
