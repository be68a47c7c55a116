//! PostgreSQL account store

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::{Account, Amount, DomainError, NewAccount};

use super::{with_deadline, AccountStore, StoreError, StoreResult, TransferReceipt};

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: i32,
    first_name: String,
    last_name: String,
    number: i64,
    balance: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            number: row.number,
            balance: row.balance,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

/// Account store backed by the `account` table
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgAccountStore {
    /// Create a new store; every call is bounded by `timeout`.
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Shift `delta` onto a locked row's balance
    async fn apply_delta(
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
        delta: i64,
    ) -> Result<AccountRow, sqlx::Error> {
        sqlx::query_as::<_, AccountRow>(
            r#"
            UPDATE account
            SET balance = balance + $2,
                updated_at = GREATEST(clock_timestamp(), updated_at + INTERVAL '1 microsecond')
            WHERE id = $1
            RETURNING id, first_name, last_name, number, balance, created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_one(&mut **tx)
        .await
    }

    async fn insert(&self, account: NewAccount) -> StoreResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO account (first_name, last_name, number, balance)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, number, balance, created_at, updated_at, deleted_at
            "#,
        )
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.number)
        .bind(account.balance)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateNumber(account.number)
            } else {
                StoreError::Database(e)
            }
        })?;

        tracing::debug!(account_id = row.id, "Account row inserted");
        Ok(row.into())
    }

    async fn select_active(&self) -> StoreResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, first_name, last_name, number, balance, created_at, updated_at, deleted_at
            FROM account
            WHERE deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Account::from).collect())
    }

    async fn select_by_id(&self, id: i32) -> StoreResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, first_name, last_name, number, balance, created_at, updated_at, deleted_at
            FROM account
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::from)
            .ok_or_else(|| StoreError::account_id(id))
    }

    async fn soft_delete(&self, id: i32) -> StoreResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE account
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            tracing::debug!(account_id = id, "Delete was a no-op");
        }
        Ok(())
    }

    async fn write_account(&self, account: &Account) -> StoreResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            UPDATE account
            SET balance = $2, updated_at = GREATEST(clock_timestamp(), updated_at + INTERVAL '1 microsecond')
            WHERE id = $1 AND deleted_at IS NULL AND updated_at = $3
            RETURNING id, first_name, last_name, number, balance, created_at, updated_at, deleted_at
            "#,
        )
        .bind(account.id)
        .bind(account.balance)
        .bind(account.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => {
                // Missing rows surface as NotFound, otherwise the version was stale
                self.select_by_id(account.id).await?;
                Err(StoreError::Conflict(account.id))
            }
        }
    }

    async fn transfer_in_tx(
        &self,
        from_id: i32,
        to_number: i64,
        amount: Amount,
    ) -> StoreResult<TransferReceipt> {
        let mut tx = self.pool.begin().await?;

        let to_id: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM account WHERE number = $1 AND deleted_at IS NULL",
        )
        .bind(to_number)
        .fetch_optional(&mut *tx)
        .await?;
        let to_id = to_id.ok_or_else(|| StoreError::account_number(to_number))?;

        if to_id == from_id {
            return Err(DomainError::SameAccountTransfer.into());
        }

        // Lock both rows in ascending id order so opposing transfers cannot deadlock
        let locked = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, first_name, last_name, number, balance, created_at, updated_at, deleted_at
            FROM account
            WHERE id = ANY($1) AND deleted_at IS NULL
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(vec![from_id, to_id])
        .fetch_all(&mut *tx)
        .await?;

        let from = locked
            .iter()
            .find(|row| row.id == from_id)
            .ok_or_else(|| StoreError::account_id(from_id))?;
        let to = locked
            .iter()
            .find(|row| row.id == to_id)
            .ok_or_else(|| StoreError::account_number(to_number))?;

        if !amount.is_covered_by(from.balance) {
            return Err(DomainError::insufficient_funds(amount.value(), from.balance).into());
        }
        if to.balance.checked_add(amount.value()).is_none() {
            return Err(DomainError::BalanceOverflow.into());
        }

        let from = Self::apply_delta(&mut tx, from_id, -amount.value()).await?;
        let to = Self::apply_delta(&mut tx, to_id, amount.value()).await?;

        tx.commit().await?;

        tracing::debug!(
            from_account = from.id,
            to_account = to.id,
            amount = %amount,
            "Transfer committed"
        );

        Ok(TransferReceipt {
            from: from.into(),
            to: to.into(),
            amount,
        })
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
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
        with_deadline(self.timeout, self.transfer_in_tx(from_id, to_number, amount)).await
    }
}
