//! Command definitions
//!
//! Commands represent intentions to change the system state.

use serde::{Deserialize, Serialize};

use crate::domain::Account;

// =========================================================================
// CreateAccountCommand
// =========================================================================

/// Command to open a new account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountCommand {
    pub first_name: String,
    pub last_name: String,
}

impl CreateAccountCommand {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

// =========================================================================
// TransferCommand
// =========================================================================

/// Command to move funds out of an account the caller owns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferCommand {
    /// Row id of the source account (already ownership-checked)
    pub from_account_id: i32,
    /// Account number of the recipient
    pub to_account_number: i64,
    /// Raw requested amount; validated by the handler
    pub amount: i64,
}

impl TransferCommand {
    pub fn new(from_account_id: i32, to_account_number: i64, amount: i64) -> Self {
        Self {
            from_account_id,
            to_account_number,
            amount,
        }
    }
}

/// Result of a successful account creation. The token is handed to the
/// caller out-of-band and must not be logged.
#[derive(Debug, Clone)]
pub struct CreateAccountResult {
    pub account: Account,
    pub token: String,
}

/// Result of a successful transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    pub from_account_number: i64,
    pub to_account_number: i64,
    pub amount: i64,
    /// Source balance after the debit
    pub balance: i64,
}
