//! Account Store
//!
//! Durable CRUD over account records. Every read path filters out
//! soft-deleted rows, and `transfer` is the only operation that touches two
//! rows, so it is the transactional boundary for money movement.

mod error;
mod memory;
mod postgres;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Account, Amount, NewAccount};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryAccountStore;
pub use postgres::PgAccountStore;

/// Both sides of a committed transfer, as persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub from: Account,
    pub to: Account,
    pub amount: Amount,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account; the store assigns `id` and timestamps.
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account>;

    /// All active accounts, ascending by id.
    async fn get_accounts(&self) -> StoreResult<Vec<Account>>;

    /// A single active account, or `NotFound`.
    async fn get_account_by_id(&self, id: i32) -> StoreResult<Account>;

    /// Mark the account deleted. Deleting a missing or already-deleted
    /// account is a no-op and keeps the original `deleted_at`.
    async fn delete_account(&self, id: i32) -> StoreResult<()>;

    /// Persist the balance of an active account, refreshing `updated_at`.
    ///
    /// `account.updated_at` is the version the caller read. If the row has
    /// changed since then the write is refused with `Conflict`. Names and
    /// number are never rewritten.
    async fn update_account(&self, account: &Account) -> StoreResult<Account>;

    /// Move `amount` from the active account `from_id` to the active account
    /// numbered `to_number`. Both legs commit together or not at all.
    async fn transfer(
        &self,
        from_id: i32,
        to_number: i64,
        amount: Amount,
    ) -> StoreResult<TransferReceipt>;
}

/// Bound a store call by `deadline`. The inner future is dropped on expiry,
/// which rolls back any open transaction.
pub(crate) async fn with_deadline<T, F>(deadline: Duration, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(deadline_ms = %deadline.as_millis(), "Store call timed out");
            Err(StoreError::Timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_deadline_passes_through() {
        let result = with_deadline(Duration::from_millis(100), async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_with_deadline_times_out() {
        let result: StoreResult<()> = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(StoreError::Timeout)));
    }
}
