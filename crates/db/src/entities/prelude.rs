//! Entity re-exports.

pub use super::scores::Entity as Scores;
pub use super::transfers::Entity as Transfers;
pub use super::users::Entity as Users;
