//! Shared fixtures for database integration tests.

#![allow(dead_code)]

use sea_orm::{ConnectOptions, Database, DatabaseConnection, EntityTrait};

use kassa_db::entities::scores;
use kassa_db::migration::{Migrator, MigratorTrait};
use kassa_db::{AccountRepository, CreateUserInput, TransferRepository, UserRepository};
use kassa_shared::types::{AccountNumber, MinorUnits, UserId};

/// Fresh in-memory SQLite database with the schema applied.
///
/// A single pooled connection keeps every query on the same in-memory
/// database, so concurrent units serialize on the pool.
pub async fn sqlite() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory SQLite");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    db
}

/// Creates a user and returns its internal id.
pub async fn user(db: &DatabaseConnection, first_name: &str) -> UserId {
    let model = UserRepository::new(db.clone())
        .create(CreateUserInput {
            first_name: first_name.to_string(),
            last_name: "Tester".to_string(),
            email: Some(format!("{}@example.com", first_name.to_lowercase())),
            phone: None,
        })
        .await
        .expect("Failed to create user");
    UserId(model.id)
}

/// Opens an account with `balance` and returns its number.
pub async fn account(db: &DatabaseConnection, owner: UserId, balance: i64) -> AccountNumber {
    let model = AccountRepository::new(db.clone())
        .open_account(owner, MinorUnits::new(balance))
        .await
        .expect("Failed to open account");
    AccountNumber::new(model.score_number)
}

/// Reads the stored balance of an account, open or closed.
pub async fn balance_of(db: &DatabaseConnection, number: &AccountNumber) -> i64 {
    AccountRepository::new(db.clone())
        .find_by_number(number)
        .await
        .expect("Failed to read account")
        .expect("Account should exist")
        .balance
}

/// Sum of every balance in the store.
pub async fn total_balance(db: &DatabaseConnection) -> i64 {
    scores::Entity::find()
        .all(db)
        .await
        .expect("Failed to list accounts")
        .iter()
        .map(|s| s.balance)
        .sum()
}

/// Number of ledger records.
pub async fn transfer_count(db: &DatabaseConnection) -> u64 {
    TransferRepository::new(db.clone())
        .count()
        .await
        .expect("Failed to count transfers")
}
