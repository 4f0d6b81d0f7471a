//! CORS policy.
//!
//! The endpoints are called from browser front-ends on other origins, so
//! every response allows any origin. Preflight requests are answered here
//! and never reach a handler.

use axum::http::{HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};

/// Request headers browsers may send.
pub const ALLOWED_HEADERS: [&str; 4] = ["authorization", "x-client-info", "apikey", "content-type"];

/// Build the CORS layer.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(ALLOWED_HEADERS.map(HeaderName::from_static))
}
