//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repositories for users, accounts, and the transfer ledger
//! - The atomic transfer executor
//! - Database migrations

pub mod entities;
pub mod executor;
pub mod migration;
pub mod repositories;
pub mod service;

pub use executor::TransferExecutor;
pub use repositories::{
    AccountQuery, AccountRepository, CreateUserInput, TransferRepository, UserError,
    UserRepository,
};
pub use service::{TransferService, TransferServiceError};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use kassa_shared::config::DatabaseConfig;

/// Establishes a connection pool from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs));
    Database::connect(options).await
}
