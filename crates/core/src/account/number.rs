//! Human-facing account numbers: `ACC` followed by six digits.

use rand::Rng;

use kassa_shared::types::AccountNumber;

/// Prefix of every generated account number.
pub const ACCOUNT_NUMBER_PREFIX: &str = "ACC";

/// Number of random digits after the prefix.
pub const ACCOUNT_NUMBER_DIGITS: usize = 6;

/// Generates a random account number.
///
/// Uniqueness is enforced by the store; callers retry on collision.
pub fn generate_account_number<R: Rng + ?Sized>(rng: &mut R) -> AccountNumber {
    let mut value = String::with_capacity(ACCOUNT_NUMBER_PREFIX.len() + ACCOUNT_NUMBER_DIGITS);
    value.push_str(ACCOUNT_NUMBER_PREFIX);
    for _ in 0..ACCOUNT_NUMBER_DIGITS {
        let digit: u8 = rng.random_range(0..10);
        value.push(char::from(b'0' + digit));
    }
    AccountNumber::new(value)
}

/// Returns true if `number` has the generated shape.
#[must_use]
pub fn is_well_formed(number: &AccountNumber) -> bool {
    number
        .as_str()
        .strip_prefix(ACCOUNT_NUMBER_PREFIX)
        .is_some_and(|rest| rest.len() == ACCOUNT_NUMBER_DIGITS && rest.bytes().all(|b| b.is_ascii_digit()))
}
