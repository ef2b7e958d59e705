//! Point-in-time view of an account row.

use serde::{Deserialize, Serialize};

use kassa_shared::types::{AccountId, AccountNumber, MinorUnits, UserId};

/// The state of one account as read from the store.
///
/// Snapshots are produced by the storage layer and never mutated; a transfer
/// decision is always made against snapshots read under the account lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Internal row id.
    pub id: AccountId,
    /// Human-facing account number.
    pub number: AccountNumber,
    /// Owning user.
    pub owner: UserId,
    /// Current balance.
    pub balance: MinorUnits,
    /// Whether the account is still open.
    pub active: bool,
}

impl AccountSnapshot {
    /// Returns true if `user` owns this account.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }
}
