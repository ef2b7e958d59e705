//! Open and close rules for accounts.

use kassa_shared::types::{MinorUnits, UserId};

use super::error::AccountError;
use super::snapshot::AccountSnapshot;

/// Validates the inputs of an open-account request.
///
/// # Errors
///
/// - `InvalidUser` if the user id is not positive
/// - `NegativeOpeningBalance` if the opening balance is below zero
pub fn validate_opening(user: UserId, initial_balance: MinorUnits) -> Result<(), AccountError> {
    if !user.is_valid() {
        return Err(AccountError::InvalidUser(user));
    }
    if initial_balance.is_negative() {
        return Err(AccountError::NegativeOpeningBalance(initial_balance));
    }
    Ok(())
}

/// Validates that `requester` may close `account`.
///
/// Ownership is checked before state, so a stranger cannot learn whether an
/// account is already closed.
///
/// # Errors
///
/// - `Unauthorized` if the requester does not own the account
/// - `Closed` if the account is already closed
pub fn validate_close(account: &AccountSnapshot, requester: UserId) -> Result<(), AccountError> {
    if !account.is_owned_by(requester) {
        return Err(AccountError::Unauthorized {
            account: account.number.clone(),
            user: requester,
        });
    }
    if !account.active {
        return Err(AccountError::Closed(account.number.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kassa_shared::types::{AccountId, AccountNumber};

    fn account(owner: i64, active: bool) -> AccountSnapshot {
        AccountSnapshot {
            id: AccountId(1),
            number: AccountNumber::from("ACC000001"),
            owner: UserId(owner),
            balance: MinorUnits::new(100),
            active,
        }
    }

    #[test]
    fn test_opening_accepts_zero_balance() {
        assert!(validate_opening(UserId(1), MinorUnits::ZERO).is_ok());
        assert!(validate_opening(UserId(1), MinorUnits::new(5000)).is_ok());
    }

    #[test]
    fn test_opening_rejects_bad_user() {
        assert!(matches!(
            validate_opening(UserId(0), MinorUnits::new(10)),
            Err(AccountError::InvalidUser(_))
        ));
        assert!(matches!(
            validate_opening(UserId(-1), MinorUnits::new(10)),
            Err(AccountError::InvalidUser(_))
        ));
    }

    #[test]
    fn test_opening_rejects_negative_balance() {
        assert!(matches!(
            validate_opening(UserId(1), MinorUnits::new(-1)),
            Err(AccountError::NegativeOpeningBalance(_))
        ));
    }

    #[test]
    fn test_close_by_owner() {
        assert!(validate_close(&account(1, true), UserId(1)).is_ok());
    }

    #[test]
    fn test_close_by_stranger() {
        assert!(matches!(
            validate_close(&account(1, true), UserId(2)),
            Err(AccountError::Unauthorized { .. })
        ));
        // ownership wins over state
        assert!(matches!(
            validate_close(&account(1, false), UserId(2)),
            Err(AccountError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_close_twice() {
        assert!(matches!(
            validate_close(&account(1, false), UserId(1)),
            Err(AccountError::Closed(_))
        ));
    }
}
