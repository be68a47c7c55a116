//! bank_api Library
//!
//! Re-exports modules for the server binary and integration testing.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod store;

mod error;

pub use config::Config;
pub use domain::{Account, Amount, DomainError, NewAccount, OperationContext};
pub use error::{AppError, ErrorResponse};
