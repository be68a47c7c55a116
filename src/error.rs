//! Error handling module
//!
//! Centralized error types and HTTP response conversion.
//! Authorization failures all render as 403 `permission denied`; every other
//! failure renders as 400 with a message that never carries store internals.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{GuardError, TokenError};
use crate::domain::DomainError;
use crate::store::StoreError;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("permission denied")]
    PermissionDenied,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("store timeout")]
    Timeout,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    /// Status code and client-facing message
    fn parts(&self) -> (StatusCode, String) {
        match self {
            // 403 Forbidden
            AppError::PermissionDenied => (StatusCode::FORBIDDEN, self.to_string()),

            // 400 Bad Request, message is safe to show
            AppError::InvalidRequest(_) | AppError::Domain(_) | AppError::Timeout => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }

            // The identifier is not echoed, so account numbers cannot be enumerated
            AppError::AccountNotFound(what) => {
                tracing::debug!(account = %what, "Account not found");
                (StatusCode::BAD_REQUEST, "account not found".to_string())
            }

            // 400 Bad Request, details stay in the logs
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::BAD_REQUEST, "store error".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::BAD_REQUEST, "internal error".to_string())
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::BAD_REQUEST, "configuration error".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.parts();
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::AccountNotFound(what),
            StoreError::Rejected(domain) => AppError::Domain(domain),
            StoreError::Timeout => AppError::Timeout,
            StoreError::Database(e) => AppError::Database(e),
            e @ StoreError::Conflict(_) => AppError::InvalidRequest(e.to_string()),
            e @ StoreError::DuplicateNumber(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<GuardError> for AppError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Unauthorized => AppError::PermissionDenied,
            e @ GuardError::BadRequest(_) => AppError::InvalidRequest(e.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed | TokenError::InvalidSignature | TokenError::Expired => {
                AppError::PermissionDenied
            }
            e @ (TokenError::MissingSecret | TokenError::Encoding(_)) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_permission_denied_envelope() {
        let (status, body) = render(AppError::PermissionDenied).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, serde_json::json!({ "error": "permission denied" }));
    }

    #[tokio::test]
    async fn test_token_failures_collapse_to_denial() {
        for err in [TokenError::Malformed, TokenError::InvalidSignature, TokenError::Expired] {
            let (status, body) = render(err.into()).await;
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(body["error"], "permission denied");
        }
    }

    #[tokio::test]
    async fn test_store_internals_not_leaked() {
        let (status, body) = render(AppError::Database(sqlx::Error::RowNotFound)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "store error");

        let (_, body) = render(StoreError::DuplicateNumber(5).into()).await;
        assert_eq!(body["error"], "internal error");
    }

    #[tokio::test]
    async fn test_domain_errors_are_bad_request() {
        let (status, body) = render(DomainError::insufficient_funds(150, 100).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Insufficient funds: required 150, available 100");
    }

    #[tokio::test]
    async fn test_not_found_hides_identifier() {
        let (status, body) = render(StoreError::NotFound("number 424242".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "error": "account not found" }));
    }

    #[tokio::test]
    async fn test_store_error_mapping() {
        assert!(matches!(
            AppError::from(StoreError::NotFound("id 1".into())),
            AppError::AccountNotFound(_)
        ));
        assert!(matches!(AppError::from(StoreError::Timeout), AppError::Timeout));
        assert!(matches!(
            AppError::from(StoreError::Conflict(3)),
            AppError::InvalidRequest(_)
        ));
        assert!(matches!(
            AppError::from(GuardError::BadRequest("x".into())),
            AppError::InvalidRequest(_)
        ));
    }
}
