//! Transfer domain logic.
//!
//! This module is pure: it decides whether a transfer may happen given
//! snapshots of the two accounts, and describes the outcome. Applying the
//! decision atomically is the job of the storage layer.
//!
//! - `error` - The closed `TransferFailure` taxonomy
//! - `types` - Transfer records, statuses, and idempotency keys
//! - `validation` - The ordered precondition checks
//! - `feasibility` - Read-only previews of a transfer

pub mod error;
pub mod feasibility;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::TransferFailure;
pub use feasibility::FeasibilityReport;
pub use types::{
    IDEMPOTENCY_KEY_MAX_LEN, IdempotencyKey, TransferRecord, TransferRequest, TransferStatus,
};
pub use validation::{TransferPlan, TransferSnapshot, TransferValidator};
