//! Property-based tests for transfer validation.

use proptest::prelude::*;

use kassa_shared::types::{AccountId, AccountNumber, MinorUnits, UserId};

use super::error::TransferFailure;
use super::validation::{TransferSnapshot, TransferValidator};
use crate::account::AccountSnapshot;

fn balance() -> impl Strategy<Value = i64> {
    0i64..1_000_000_000i64
}

fn account(id: i64, number: &str, balance: i64, active: bool) -> AccountSnapshot {
    AccountSnapshot {
        id: AccountId(id),
        number: AccountNumber::from(number),
        owner: UserId(id),
        balance: MinorUnits::new(balance),
        active,
    }
}

fn from() -> AccountNumber {
    AccountNumber::from("ACC100000")
}

fn to() -> AccountNumber {
    AccountNumber::from("ACC200000")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A valid plan moves exactly `amount` and conserves the total.
    #[test]
    fn prop_plan_conserves_total(
        source in balance(),
        dest in balance(),
        amount in 1i64..1_000_000_000i64,
    ) {
        let snapshot = TransferSnapshot::new(
            Some(account(1, "ACC100000", source, true)),
            Some(account(2, "ACC200000", dest, true)),
        );
        match TransferValidator::validate(&from(), &to(), MinorUnits::new(amount), &snapshot) {
            Ok(plan) => {
                prop_assert!(source >= amount);
                prop_assert_eq!(plan.source_balance_after.get(), source - amount);
                prop_assert_eq!(plan.destination_balance_after.get(), dest + amount);
                prop_assert_eq!(
                    plan.source_balance_after.get() + plan.destination_balance_after.get(),
                    source + dest
                );
                prop_assert!(!plan.source_balance_after.is_negative());
            }
            Err(failure) => {
                prop_assert!(source < amount);
                let is_insufficient = matches!(failure, TransferFailure::InsufficientFunds { .. });
                prop_assert!(is_insufficient);
            }
        }
    }

    /// Non-positive amounts are rejected before anything else is looked at.
    #[test]
    fn prop_invalid_amount_wins(
        amount in i64::MIN..=0i64,
        same in any::<bool>(),
        source_exists in any::<bool>(),
    ) {
        let to = if same { from() } else { to() };
        let source = source_exists.then(|| account(1, "ACC100000", 0, false));
        let snapshot = TransferSnapshot::new(source, None);
        let result = TransferValidator::validate(&from(), &to, MinorUnits::new(amount), &snapshot);
        prop_assert_eq!(result, Err(TransferFailure::InvalidAmount(MinorUnits::new(amount))));
    }

    /// Self-transfers fail as such whatever the account state.
    #[test]
    fn prop_self_transfer_always_rejected(
        amount in 1i64..1_000_000i64,
        source_balance in balance(),
        active in any::<bool>(),
    ) {
        let snap = account(1, "ACC100000", source_balance, active);
        let snapshot = TransferSnapshot::new(Some(snap.clone()), Some(snap));
        let result = TransferValidator::validate(&from(), &from(), MinorUnits::new(amount), &snapshot);
        prop_assert_eq!(result, Err(TransferFailure::SelfTransfer(from())));
    }

    /// A closed account on either side is reported as closed, regardless of balance.
    #[test]
    fn prop_closed_account_always_rejected(
        amount in 1i64..1_000_000i64,
        source_balance in balance(),
        close_source in any::<bool>(),
    ) {
        let snapshot = TransferSnapshot::new(
            Some(account(1, "ACC100000", source_balance, !close_source)),
            Some(account(2, "ACC200000", 0, close_source)),
        );
        let result = TransferValidator::validate(&from(), &to(), MinorUnits::new(amount), &snapshot);
        let is_closed = matches!(result, Err(TransferFailure::AccountClosed(_)));
        prop_assert!(is_closed);
    }
}
