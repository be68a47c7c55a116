//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;

/// Header carrying the bearer token, both inbound and on account creation
pub const TOKEN_HEADER: &str = "x-jwt-token";

/// Header carrying the request correlation id
pub const CORRELATION_HEADER: &str = "x-correlation-id";
