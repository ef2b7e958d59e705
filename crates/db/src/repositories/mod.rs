//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod transfer;
pub mod user;

pub use account::{AccountQuery, AccountRepository, MAX_NUMBER_ATTEMPTS};
pub use transfer::{NewTransfer, TransferRepository};
pub use user::{CreateUserInput, UserError, UserRepository};
