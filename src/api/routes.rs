//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthenticatedAccount;
use crate::domain::{Account, OperationContext};
use crate::error::AppError;
use crate::handlers::{CreateAccountCommand, TransferCommand};

use super::middleware::jwt_auth_middleware;
use super::{AppState, TOKEN_HEADER};

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteAccountResponse {
    pub deleted: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    #[serde(rename = "toAccount")]
    pub to_account: i64,
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferResponse {
    #[serde(rename = "fromAccount")]
    pub from_account: i64,
    #[serde(rename = "toAccount")]
    pub to_account: i64,
    pub amount: i64,
    pub balance: i64,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router. Routes under `/account/:id` are guarded by the
/// token ownership check.
pub fn create_router(state: AppState) -> Router {
    let guarded = Router::new()
        .route(
            "/account/:id",
            get(get_account_by_id).delete(delete_account),
        )
        .route("/account/:id/transfer", post(transfer))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    Router::new()
        .route("/account", get(list_accounts).post(create_account))
        .merge(guarded)
        .with_state(state)
}

// =========================================================================
// GET /account
// =========================================================================

/// List all active accounts
async fn list_accounts(State(state): State<AppState>) -> Result<Json<Vec<Account>>, AppError> {
    Ok(Json(state.accounts.list_accounts().await?))
}

// =========================================================================
// POST /account
// =========================================================================

/// Open an account. The owner's token is returned in the `x-jwt-token`
/// response header.
async fn create_account(
    State(state): State<AppState>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<([(&'static str, String); 1], Json<Account>), AppError> {
    let Json(request) = payload?;

    let result = state
        .accounts
        .create_account(CreateAccountCommand::new(request.first_name, request.last_name))
        .await?;

    Ok(([(TOKEN_HEADER, result.token)], Json(result.account)))
}

// =========================================================================
// GET /account/:id
// =========================================================================

async fn get_account_by_id(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedAccount>,
) -> Result<Json<Account>, AppError> {
    Ok(Json(state.accounts.get_account(caller.id).await?))
}

// =========================================================================
// DELETE /account/:id
// =========================================================================

async fn delete_account(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedAccount>,
) -> Result<Json<DeleteAccountResponse>, AppError> {
    let deleted = state.accounts.delete_account(caller.id).await?;
    Ok(Json(DeleteAccountResponse { deleted }))
}

// =========================================================================
// POST /account/:id/transfer
// =========================================================================

/// Transfer from the guarded account to another account by number
async fn transfer(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedAccount>,
    context: Option<Extension<OperationContext>>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, AppError> {
    let Json(request) = payload?;

    let context = context
        .map(|Extension(ctx)| ctx)
        .unwrap_or_default()
        .with_account_number(caller.number);

    let command = TransferCommand::new(caller.id, request.to_account, request.amount);
    let result = state.transfers.execute(command, &context).await?;

    Ok(Json(TransferResponse {
        from_account: result.from_account_number,
        to_account: result.to_account_number,
        amount: result.amount,
        balance: result.balance,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_account_request_deserialize() {
        let json = r#"{ "firstName": "Ada", "lastName": "Lovelace" }"#;

        let request: CreateAccountRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.first_name, "Ada");
        assert_eq!(request.last_name, "Lovelace");
    }

    #[test]
    fn test_transfer_request_deserialize() {
        let json = r#"{ "toAccount": 123456, "amount": 40 }"#;

        let request: TransferRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.to_account, 123456);
        assert_eq!(request.amount, 40);
    }

    #[test]
    fn test_transfer_request_requires_fields() {
        assert!(serde_json::from_str::<TransferRequest>(r#"{ "amount": 40 }"#).is_err());
    }
}
