//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. CORS (permissive, answers preflight requests)
//! 3. `TraceLayer` (request tracing)
//! 4. Request ID (add unique ID to each request)
//!
//! Authentication is done per handler with the [`RequireUser`] and
//! [`RequireAdmin`] extractors.

pub mod auth;
pub mod cors;
pub mod request_id;

pub use auth::{RequireAdmin, RequireUser, bearer_token};
pub use cors::cors_layer;
pub use request_id::request_id_middleware;
