//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Domain-specific errors
///
/// These errors represent business rule violations on accounts and transfers.
/// They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Transfer amount is zero or negative
    #[error("Invalid amount: must be positive (got {0})")]
    InvalidAmount(i64),

    /// Source balance cannot cover the debit
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    /// Transfer to same account
    #[error("Cannot transfer to the same account")]
    SameAccountTransfer,

    /// A write would leave a balance below zero
    #[error("Balance cannot be negative (got {0})")]
    NegativeBalance(i64),

    /// Crediting would overflow the destination balance
    #[error("Balance overflow")]
    BalanceOverflow,

    /// First or last name missing or too long
    #[error("Invalid name: {0}")]
    InvalidName(String),
}

impl DomainError {
    /// Create an insufficient funds error
    pub fn insufficient_funds(required: i64, available: i64) -> Self {
        Self::InsufficientFunds {
            required,
            available,
        }
    }
}
