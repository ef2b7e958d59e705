//! Shared types, errors, and configuration for Kassa.
//!
//! This crate provides common types used across all other crates:
//! - Minor-unit amounts (never floating point)
//! - Typed identifiers for users, accounts, and transfers
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and token validation

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
