//! Amount type
//!
//! Domain primitive for transfer amounts. Amounts are validated at
//! construction time, so a zero or negative transfer cannot be expressed.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::DomainError;

/// Amount represents a validated, strictly positive quantity of money
/// in minor units.
///
/// # Example
/// ```
/// use bank_api::domain::Amount;
///
/// let amount = Amount::new(40).unwrap();
/// assert_eq!(amount.value(), 40);
/// assert!(Amount::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

impl Amount {
    /// Create a new Amount.
    ///
    /// # Errors
    /// `DomainError::InvalidAmount` if value <= 0
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidAmount(value));
        }
        Ok(Self(value))
    }

    /// Get the underlying value.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Check whether `balance` can cover this amount.
    pub fn is_covered_by(&self, balance: i64) -> bool {
        balance >= self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Amount {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}
