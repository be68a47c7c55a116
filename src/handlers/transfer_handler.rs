//! Transfer Handler
//!
//! Handles transfers between accounts with full validation.

use std::sync::Arc;

use crate::domain::{Amount, DomainError, OperationContext};
use crate::error::AppError;
use crate::store::AccountStore;

use super::{TransferCommand, TransferResult};

/// Handler for account-to-account transfers
#[derive(Clone)]
pub struct TransferHandler {
    store: Arc<dyn AccountStore>,
}

impl TransferHandler {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Execute the transfer command
    pub async fn execute(
        &self,
        command: TransferCommand,
        context: &OperationContext,
    ) -> Result<TransferResult, AppError> {
        let amount = Amount::new(command.amount)?;

        if context.account_number == Some(command.to_account_number) {
            return Err(DomainError::SameAccountTransfer.into());
        }

        // Balance check, debit and credit all happen inside one store transaction
        let receipt = self
            .store
            .transfer(command.from_account_id, command.to_account_number, amount)
            .await?;

        tracing::info!(
            correlation_id = ?context.correlation_id,
            from_account = receipt.from.id,
            to_account = receipt.to.id,
            amount = %amount,
            "Transfer completed"
        );

        Ok(TransferResult {
            from_account_number: receipt.from.number,
            to_account_number: receipt.to.number,
            amount: amount.value(),
            balance: receipt.from.balance,
        })
    }
}
