//! In-process account store
//!
//! Same contract as the Postgres store. A single async mutex serializes all
//! writes, so a transfer is observed either fully applied or not at all.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::{Account, Amount, DomainError, NewAccount};

use super::{with_deadline, AccountStore, StoreError, StoreResult, TransferReceipt};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Next `updated_at` for a row; strictly later than `previous` so it can
/// serve as a version
fn next_stamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous + chrono::Duration::microseconds(1))
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i32,
    rows: BTreeMap<i32, Account>,
}

impl MemoryState {
    fn active(&self, id: i32) -> Option<&Account> {
        self.rows.get(&id).filter(|a| !a.is_deleted())
    }

    fn active_by_number(&self, number: i64) -> Option<&Account> {
        self.rows
            .values()
            .find(|a| a.number == number && !a.is_deleted())
    }
}

#[derive(Debug)]
pub struct MemoryAccountStore {
    state: Mutex<MemoryState>,
    timeout: Duration,
    latency: Option<Duration>,
}

impl Default for MemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            timeout: DEFAULT_TIMEOUT,
            latency: None,
        }
    }

    /// Deadline applied to every call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Simulated round-trip delay, taken before any write is applied
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn round_trip(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    async fn insert(&self, account: NewAccount) -> StoreResult<Account> {
        let mut state = self.state.lock().await;
        self.round_trip().await;

        if state.active_by_number(account.number).is_some() {
            return Err(StoreError::DuplicateNumber(account.number));
        }

        state.last_id += 1;
        let now = Utc::now();
        let created = Account {
            id: state.last_id,
            first_name: account.first_name,
            last_name: account.last_name,
            number: account.number,
            balance: account.balance,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        state.rows.insert(created.id, created.clone());
        Ok(created)
    }

    async fn select_active(&self) -> StoreResult<Vec<Account>> {
        let state = self.state.lock().await;
        self.round_trip().await;
        Ok(state
            .rows
            .values()
            .filter(|a| !a.is_deleted())
            .cloned()
            .collect())
    }

    async fn select_by_id(&self, id: i32) -> StoreResult<Account> {
        let state = self.state.lock().await;
        self.round_trip().await;
        state
            .active(id)
            .cloned()
            .ok_or_else(|| StoreError::account_id(id))
    }

    async fn soft_delete(&self, id: i32) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        self.round_trip().await;
        if let Some(account) = state.rows.get_mut(&id).filter(|a| !a.is_deleted()) {
            let now = next_stamp(account.updated_at);
            account.deleted_at = Some(now);
            account.updated_at = now;
        }
        Ok(())
    }

    async fn write_account(&self, account: &Account) -> StoreResult<Account> {
        let mut state = self.state.lock().await;
        self.round_trip().await;
        let stored = state
            .rows
            .get_mut(&account.id)
            .filter(|a| !a.is_deleted())
            .ok_or_else(|| StoreError::account_id(account.id))?;

        if stored.updated_at != account.updated_at {
            return Err(StoreError::Conflict(account.id));
        }

        stored.balance = account.balance;
        stored.updated_at = next_stamp(stored.updated_at);
        Ok(stored.clone())
    }

    async fn apply_transfer(
        &self,
        from_id: i32,
        to_number: i64,
        amount: Amount,
    ) -> StoreResult<TransferReceipt> {
        let mut state = self.state.lock().await;
        self.round_trip().await;

        let to_id = state
            .active_by_number(to_number)
            .map(|a| a.id)
            .ok_or_else(|| StoreError::account_number(to_number))?;
        let from_balance = state
            .active(from_id)
            .map(|a| a.balance)
            .ok_or_else(|| StoreError::account_id(from_id))?;

        if to_id == from_id {
            return Err(DomainError::SameAccountTransfer.into());
        }
        if !amount.is_covered_by(from_balance) {
            return Err(DomainError::insufficient_funds(amount.value(), from_balance).into());
        }
        let to_balance = state
            .active(to_id)
            .map(|a| a.balance)
            .ok_or_else(|| StoreError::account_number(to_number))?
            .checked_add(amount.value())
            .ok_or(DomainError::BalanceOverflow)?;

        // Both legs are validated; apply them under the same lock
        let mut legs = Vec::with_capacity(2);
        for (id, balance) in [(from_id, from_balance - amount.value()), (to_id, to_balance)] {
            let account = state
                .rows
                .get_mut(&id)
                .ok_or_else(|| StoreError::account_id(id))?;
            account.balance = balance;
            account.updated_at = next_stamp(account.updated_at);
            legs.push(account.clone());
        }

        let to = legs.pop().ok_or_else(|| StoreError::account_number(to_number))?;
        let from = legs.pop().ok_or_else(|| StoreError::account_id(from_id))?;
        Ok(TransferReceipt { from, to, amount })
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create_account(&self, account: NewAccount) -> StoreResult<Account> {
        with_deadline(self.timeout, self.insert(account)).await
    }

    async fn get_accounts(&self) -> StoreResult<Vec<Account>> {
        with_deadline(self.timeout, self.select_active()).await
    }

    async fn get_account_by_id(&self, id: i32) -> StoreResult<Account> {
        with_deadline(self.timeout, self.select_by_id(id)).await
    }

    async fn delete_account(&self, id: i32) -> StoreResult<()> {
        with_deadline(self.timeout, self.soft_delete(id)).await
    }

    async fn update_account(&self, account: &Account) -> StoreResult<Account> {
        if account.balance < 0 {
            return Err(DomainError::NegativeBalance(account.balance).into());
        }
        with_deadline(self.timeout, self.write_account(account)).await
    }

    async fn transfer(
        &self,
        from_id: i32,
        to_number: i64,
        amount: Amount,
    ) -> StoreResult<TransferReceipt> {
        with_deadline(self.timeout, self.apply_transfer(from_id, to_number, amount)).await
    }
}
