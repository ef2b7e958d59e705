//! Read-only transfer previews.

use serde::Serialize;

use kassa_shared::types::{AccountNumber, MinorUnits};

use super::error::TransferFailure;
use super::validation::{TransferSnapshot, TransferValidator};

/// Outcome of running the validator without applying anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeasibilityReport {
    /// Whether the source account exists.
    pub from_exists: bool,
    /// Whether the destination account exists.
    pub to_exists: bool,
    /// Source balance, when the source exists and is open.
    pub balance: Option<MinorUnits>,
    /// Requested amount.
    pub amount: MinorUnits,
    /// Whether the transfer would succeed right now.
    pub feasible: bool,
    /// Code of the first failing check.
    pub failure: Option<&'static str>,
    /// Message of the first failing check.
    pub reason: Option<String>,
}

impl FeasibilityReport {
    /// Builds a report from a committed-state snapshot.
    ///
    /// The answer can be stale by the time a transfer is submitted.
    #[must_use]
    pub fn evaluate(
        from: &AccountNumber,
        to: &AccountNumber,
        amount: MinorUnits,
        snapshot: &TransferSnapshot,
    ) -> Self {
        let outcome = TransferValidator::validate(from, to, amount, snapshot);
        let failure: Option<TransferFailure> = outcome.err();

        Self {
            from_exists: snapshot.source.is_some(),
            to_exists: snapshot.destination.is_some(),
            balance: snapshot
                .source
                .as_ref()
                .filter(|s| s.active)
                .map(|s| s.balance),
            amount,
            feasible: failure.is_none(),
            failure: failure.as_ref().map(TransferFailure::code),
            reason: failure.map(|f| f.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountSnapshot;
    use kassa_shared::types::{AccountId, UserId};

    fn account(id: i64, number: &str, balance: i64) -> AccountSnapshot {
        AccountSnapshot {
            id: AccountId(id),
            number: AccountNumber::from(number),
            owner: UserId(1),
            balance: MinorUnits::new(balance),
            active: true,
        }
    }

    #[test]
    fn test_feasible() {
        let snapshot = TransferSnapshot::new(
            Some(account(1, "ACC000001", 500)),
            Some(account(2, "ACC000002", 0)),
        );
        let report = FeasibilityReport::evaluate(
            &AccountNumber::from("ACC000001"),
            &AccountNumber::from("ACC000002"),
            MinorUnits::new(500),
            &snapshot,
        );
        assert!(report.feasible);
        assert!(report.from_exists && report.to_exists);
        assert_eq!(report.balance, Some(MinorUnits::new(500)));
        assert_eq!(report.failure, None);
        assert_eq!(report.reason, None);
    }

    #[test]
    fn test_infeasible_reports_first_failure() {
        let snapshot = TransferSnapshot::new(Some(account(1, "ACC000001", 100)), None);
        let report = FeasibilityReport::evaluate(
            &AccountNumber::from("ACC000001"),
            &AccountNumber::from("ACC000404"),
            MinorUnits::new(500),
            &snapshot,
        );
        assert!(!report.feasible);
        assert!(report.from_exists);
        assert!(!report.to_exists);
        assert_eq!(report.failure, Some("destination_not_found"));
        assert!(report.reason.is_some());
    }

    #[test]
    fn test_closed_source_hides_balance() {
        let mut source = account(1, "ACC000001", 250);
        source.active = false;
        let snapshot = TransferSnapshot::new(Some(source), Some(account(2, "ACC000002", 0)));
        let report = FeasibilityReport::evaluate(
            &AccountNumber::from("ACC000001"),
            &AccountNumber::from("ACC000002"),
            MinorUnits::new(10),
            &snapshot,
        );
        assert!(report.from_exists);
        assert_eq!(report.balance, None);
        assert_eq!(report.failure, Some("account_closed"));
    }

    #[test]
    fn test_missing_source_has_no_balance() {
        let report = FeasibilityReport::evaluate(
            &AccountNumber::from("ACC000001"),
            &AccountNumber::from("ACC000002"),
            MinorUnits::new(1),
            &TransferSnapshot::default(),
        );
        assert_eq!(report.balance, None);
        assert_eq!(report.failure, Some("source_not_found"));
    }
}
