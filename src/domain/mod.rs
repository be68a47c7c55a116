//! Domain module
//!
//! Core domain types and business rules.

pub mod account;
pub mod amount;
pub mod context;
pub mod error;

pub use account::{Account, NewAccount};
pub use amount::Amount;
pub use context::OperationContext;
pub use error::DomainError;
