//! Account ("score") domain logic.
//!
//! - Point-in-time account snapshots read by the storage layer
//! - Human-facing account number generation
//! - Open and close rules
//! - Error types for account operations

pub mod error;
pub mod number;
pub mod rules;
pub mod snapshot;

pub use error::AccountError;
pub use number::{ACCOUNT_NUMBER_DIGITS, ACCOUNT_NUMBER_PREFIX, generate_account_number, is_well_formed};
pub use rules::{validate_close, validate_opening};
pub use snapshot::AccountSnapshot;
