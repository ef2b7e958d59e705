//! Database migration runner for Kassa.
//!
//! Creates the `users`, `scores`, and `transfers` tables.
//!
//! Usage:
//!   migrator up      - Run all pending migrations
//!   migrator down    - Rollback last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations
//!
//! The database is taken from `DATABASE_URL` (or `-u`).

use sea_orm_migration::prelude::*;
use kassa_db::migration::Migrator;

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    if std::env::var_os("DATABASE_URL").is_none() {
        eprintln!(
            "DATABASE_URL is not set; pass -u <url> (the server itself reads KASSA__DATABASE__URL)"
        );
    }

    // Run the migrator CLI (it sets up its own tracing)
    cli::run_cli(Migrator).await;
}
