//! HTTP middleware for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (correlation id on span, Sentry scope and response)

pub mod auth;
pub mod request_id;

pub use auth::BearerToken;
pub use request_id::request_id_middleware;
