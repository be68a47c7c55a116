//! Authentication module
//!
//! Token issuance/validation and the per-account ownership guard.

pub mod clock;
pub mod guard;
pub mod token;

pub use clock::{Clock, FixedClock, SystemClock};
pub use guard::{authorize, AuthenticatedAccount, GuardError};
pub use token::{Claims, TokenError, TokenService};
