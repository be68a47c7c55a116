//! Account Store Errors

use crate::domain::DomainError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the account store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Account absent or soft-deleted
    #[error("Account not found: {0}")]
    NotFound(String),

    /// A business rule rejected the write (insufficient funds, overflow, ...)
    #[error(transparent)]
    Rejected(#[from] DomainError),

    /// Another active account already holds this number
    #[error("Account number already in use: {0}")]
    DuplicateNumber(i64),

    /// The row changed after the caller read it
    #[error("Account {0} was modified concurrently")]
    Conflict(i32),

    /// The call did not finish before its deadline; nothing was written
    #[error("Store call timed out")]
    Timeout,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub(crate) fn account_id(id: i32) -> Self {
        Self::NotFound(format!("id {}", id))
    }

    pub(crate) fn account_number(number: i64) -> Self {
        Self::NotFound(format!("number {}", number))
    }

    /// Check if this error is a missing/deleted account
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
