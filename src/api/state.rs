//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::auth::TokenService;
use crate::handlers::{AccountService, TransferHandler};
use crate::store::AccountStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AccountStore>,
    pub tokens: TokenService,
    pub accounts: AccountService,
    pub transfers: TransferHandler,
}

impl AppState {
    pub fn new(store: Arc<dyn AccountStore>, tokens: TokenService) -> Self {
        Self {
            accounts: AccountService::new(store.clone(), tokens.clone()),
            transfers: TransferHandler::new(store.clone()),
            store,
            tokens,
        }
    }
}
