//! Authorization Guard
//!
//! Decides whether the bearer of a token may act on the account addressed
//! by the request path. Every failure path denies access.

use crate::store::AccountStore;

use super::token::TokenService;

/// Identity established by a successful guard check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub id: i32,
    pub number: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    /// Missing/invalid token, unknown account, or ownership mismatch.
    /// The cause is logged, never returned to the caller.
    #[error("permission denied")]
    Unauthorized,

    #[error("Invalid id given {0}")]
    BadRequest(String),
}

/// Run the ownership check for `raw_id` using the token from the request header.
pub async fn authorize(
    tokens: &TokenService,
    store: &dyn AccountStore,
    token: Option<&str>,
    raw_id: &str,
) -> Result<AuthenticatedAccount, GuardError> {
    let token = match token.map(str::trim).filter(|t| !t.is_empty()) {
        Some(token) => token,
        None => {
            tracing::warn!("Denied: missing token");
            return Err(GuardError::Unauthorized);
        }
    };

    let account_number = tokens.validate(token).map_err(|e| {
        tracing::warn!(reason = %e, "Denied: token rejected");
        GuardError::Unauthorized
    })?;

    let id: i32 = raw_id
        .parse()
        .map_err(|_| GuardError::BadRequest(raw_id.to_string()))?;

    let account = store.get_account_by_id(id).await.map_err(|e| {
        if e.is_not_found() {
            tracing::warn!(account_id = id, "Denied: account not found");
        } else {
            tracing::error!(account_id = id, error = %e, "Denied: account lookup failed");
        }
        GuardError::Unauthorized
    })?;

    if account.number != account_number {
        tracing::warn!(
            account_id = id,
            token_account = account_number,
            "Denied: token does not own account"
        );
        return Err(GuardError::Unauthorized);
    }

    Ok(AuthenticatedAccount {
        id: account.id,
        number: account.number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::auth::clock::FixedClock;
    use crate::domain::NewAccount;
    use crate::store::MemoryAccountStore;

    const NOW: i64 = 1_700_000_000;

    struct Fixture {
        store: MemoryAccountStore,
        tokens: TokenService,
        clock: Arc<FixedClock>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(FixedClock::at(NOW));
        Fixture {
            store: MemoryAccountStore::new(),
            tokens: TokenService::new("guard-secret", 3600, clock.clone()).unwrap(),
            clock,
        }
    }

    async fn open(fx: &Fixture, number: i64) -> (crate::domain::Account, String) {
        let account = fx
            .store
            .create_account(NewAccount::new("Grace", "Hopper").unwrap().with_number(number))
            .await
            .unwrap();
        let token = fx.tokens.issue(&account).unwrap();
        (account, token)
    }

    #[tokio::test]
    async fn test_owner_is_admitted() {
        let fx = fixture();
        let (account, token) = open(&fx, 100).await;

        let admitted = authorize(&fx.tokens, &fx.store, Some(&token), &account.id.to_string())
            .await
            .unwrap();

        assert_eq!(admitted, AuthenticatedAccount { id: account.id, number: 100 });
    }

    #[tokio::test]
    async fn test_other_accounts_token_denied() {
        let fx = fixture();
        let (_alice, alice_token) = open(&fx, 100).await;
        let (bob, _) = open(&fx, 200).await;

        let result = authorize(&fx.tokens, &fx.store, Some(&alice_token), &bob.id.to_string()).await;
        assert_eq!(result, Err(GuardError::Unauthorized));
    }

    #[tokio::test]
    async fn test_missing_token_denied() {
        let fx = fixture();
        let (account, _) = open(&fx, 100).await;
        let id = account.id.to_string();

        assert_eq!(
            authorize(&fx.tokens, &fx.store, None, &id).await,
            Err(GuardError::Unauthorized)
        );
        assert_eq!(
            authorize(&fx.tokens, &fx.store, Some("  "), &id).await,
            Err(GuardError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn test_expired_token_denied() {
        let fx = fixture();
        let (account, token) = open(&fx, 100).await;
        fx.clock.advance(3600);

        let result = authorize(&fx.tokens, &fx.store, Some(&token), &account.id.to_string()).await;
        assert_eq!(result, Err(GuardError::Unauthorized));
    }

    #[tokio::test]
    async fn test_bad_id_is_bad_request_after_token_check() {
        let fx = fixture();
        let (_, token) = open(&fx, 100).await;

        assert_eq!(
            authorize(&fx.tokens, &fx.store, Some(&token), "abc").await,
            Err(GuardError::BadRequest("abc".to_string()))
        );
        // Without a valid token the id is never inspected
        assert_eq!(
            authorize(&fx.tokens, &fx.store, Some("junk"), "abc").await,
            Err(GuardError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn test_unknown_and_deleted_accounts_look_the_same() {
        let fx = fixture();
        let (account, token) = open(&fx, 100).await;

        let unknown = authorize(&fx.tokens, &fx.store, Some(&token), "9999").await;

        fx.store.delete_account(account.id).await.unwrap();
        let deleted =
            authorize(&fx.tokens, &fx.store, Some(&token), &account.id.to_string()).await;

        assert_eq!(unknown, Err(GuardError::Unauthorized));
        assert_eq!(deleted, Err(GuardError::Unauthorized));
    }
}
