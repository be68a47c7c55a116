//! Command Handlers module
//!
//! Request-level operations that compose store calls with token issuance.

mod account_handler;
mod commands;
mod transfer_handler;


pub use account_handler::AccountService;
pub use commands::*;
pub use transfer_handler::TransferHandler;
