//! Account Service
//!
//! Create, list, fetch and delete accounts. Creation also issues the
//! owner's first token.

use std::sync::Arc;

use crate::auth::TokenService;
use crate::domain::{Account, NewAccount};
use crate::error::AppError;
use crate::store::{AccountStore, StoreError};

use super::{CreateAccountCommand, CreateAccountResult};

/// Attempts at drawing an unused account number before giving up
const MAX_NUMBER_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    tokens: TokenService,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Open an account with a zero balance and issue its token
    pub async fn create_account(
        &self,
        command: CreateAccountCommand,
    ) -> Result<CreateAccountResult, AppError> {
        let mut new_account = NewAccount::new(&command.first_name, &command.last_name)?;

        let mut attempt = 1;
        let account = loop {
            match self.store.create_account(new_account.clone()).await {
                Ok(account) => break account,
                Err(StoreError::DuplicateNumber(number)) if attempt < MAX_NUMBER_ATTEMPTS => {
                    tracing::warn!(number, attempt, "Account number collision, drawing again");
                    new_account.regenerate_number();
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };

        let token = self.tokens.issue(&account)?;

        tracing::info!(account_id = account.id, "Account created");

        Ok(CreateAccountResult { account, token })
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.store.get_accounts().await?)
    }

    pub async fn get_account(&self, id: i32) -> Result<Account, AppError> {
        Ok(self.store.get_account_by_id(id).await?)
    }

    /// Soft-delete the account; repeating the call is harmless
    pub async fn delete_account(&self, id: i32) -> Result<i32, AppError> {
        self.store.delete_account(id).await?;
        tracing::info!(account_id = id, "Account deleted");
        Ok(id)
    }
}
