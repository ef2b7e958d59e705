//! Ordered precondition checks for a transfer.
//!
//! Checks run in a fixed order and the first failure wins:
//! 1. amount is positive
//! 2. source and destination differ
//! 3. source exists
//! 4. destination exists
//! 5. both accounts are active
//! 6. source balance covers the amount

use kassa_shared::types::{AccountId, AccountNumber, MinorUnits};

use crate::account::AccountSnapshot;

use super::error::TransferFailure;

/// The two account snapshots a transfer decision is made against.
///
/// `None` means the account does not exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferSnapshot {
    /// Source account, if it exists.
    pub source: Option<AccountSnapshot>,
    /// Destination account, if it exists.
    pub destination: Option<AccountSnapshot>,
}

impl TransferSnapshot {
    /// Creates a snapshot from the two lookups.
    #[must_use]
    pub fn new(source: Option<AccountSnapshot>, destination: Option<AccountSnapshot>) -> Self {
        Self {
            source,
            destination,
        }
    }
}

/// The balance mutation a valid transfer will apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPlan {
    /// Account to debit.
    pub source: AccountId,
    /// Account to credit.
    pub destination: AccountId,
    /// Amount moved.
    pub amount: MinorUnits,
    /// Source balance after the debit.
    pub source_balance_after: MinorUnits,
    /// Destination balance after the credit.
    pub destination_balance_after: MinorUnits,
}

/// Stateless transfer validator.
pub struct TransferValidator;

impl TransferValidator {
    /// Checks that need no account state: a positive amount and two
    /// distinct accounts.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` or `SelfTransfer`.
    pub fn check_request(
        from: &AccountNumber,
        to: &AccountNumber,
        amount: MinorUnits,
    ) -> Result<(), TransferFailure> {
        if !amount.is_positive() {
            return Err(TransferFailure::InvalidAmount(amount));
        }
        if from == to {
            return Err(TransferFailure::SelfTransfer(from.clone()));
        }
        Ok(())
    }

    /// Validates a transfer of `amount` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as a `TransferFailure`.
    pub fn validate(
        from: &AccountNumber,
        to: &AccountNumber,
        amount: MinorUnits,
        snapshot: &TransferSnapshot,
    ) -> Result<TransferPlan, TransferFailure> {
        Self::check_request(from, to, amount)?;

        let source = snapshot
            .source
            .as_ref()
            .ok_or_else(|| TransferFailure::SourceNotFound(from.clone()))?;
        let destination = snapshot
            .destination
            .as_ref()
            .ok_or_else(|| TransferFailure::DestinationNotFound(to.clone()))?;

        if !source.active {
            return Err(TransferFailure::AccountClosed(source.number.clone()));
        }
        if !destination.active {
            return Err(TransferFailure::AccountClosed(destination.number.clone()));
        }

        if source.balance < amount {
            return Err(TransferFailure::InsufficientFunds {
                available: source.balance,
                requested: amount,
            });
        }

        let source_balance_after = source
            .balance
            .checked_sub(amount)
            .ok_or_else(|| TransferFailure::StorageError("source balance underflow".into()))?;
        let destination_balance_after = destination
            .balance
            .checked_add(amount)
            .ok_or_else(|| TransferFailure::StorageError("destination balance overflow".into()))?;

        Ok(TransferPlan {
            source: source.id,
            destination: destination.id,
            amount,
            source_balance_after,
            destination_balance_after,
        })
    }
}
