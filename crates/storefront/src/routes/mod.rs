//! HTTP routes for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (database round trip)
//!
//! # Functions
//! POST /functions/v1/add-admin             - Provision an admin (setup key)
//! POST /functions/v1/update-product-images - Apply the product image map
//! POST /functions/v1/upload-product-video  - Upload a product video (bearer)
//!
//! # Public read model
//! GET  /api/blog-posts                  - Active posts in listing order
//! GET  /api/blog-posts/{slug}           - One active post
//! GET  /api/categories                  - Active categories
//! GET  /api/products                    - Products by name
//! GET  /api/products/{id}               - One product
//! GET  /api/promotional-banner          - Active banner or null
//!
//! # Admin (bearer token + admin row)
//! GET|POST        /api/admin/blog-posts
//! GET|PUT|DELETE  /api/admin/blog-posts/{id}
//! GET|POST        /api/admin/categories
//! GET|PUT|DELETE  /api/admin/categories/{id}
//! ```

pub mod admin;
pub mod content;
pub mod functions;
pub mod health;

use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::{cors_layer, request_id_middleware};
use crate::state::AppState;

/// Request body limit for the video upload route. Larger than the video and
/// thumbnail limits combined so the per-file checks produce the rejection.
pub const UPLOAD_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// Create the function routes router.
pub fn function_routes() -> Router<AppState> {
    Router::new()
        .route("/add-admin", post(functions::add_admin))
        .route(
            "/update-product-images",
            post(functions::update_product_images),
        )
        .route(
            "/upload-product-video",
            post(functions::upload_product_video).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}

/// Create the public read-model routes router.
pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/blog-posts", get(content::list_blog_posts))
        .route("/blog-posts/{slug}", get(content::show_blog_post))
        .route("/categories", get(content::list_categories))
        .route("/products", get(content::list_products))
        .route("/products/{id}", get(content::show_product))
        .route("/promotional-banner", get(content::promotional_banner))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/blog-posts",
            get(admin::list_blog_posts).post(admin::create_blog_post),
        )
        .route(
            "/blog-posts/{id}",
            get(admin::show_blog_post)
                .put(admin::update_blog_post)
                .delete(admin::delete_blog_post),
        )
        .route(
            "/categories",
            get(admin::list_categories).post(admin::create_category),
        )
        .route(
            "/categories/{id}",
            get(admin::show_category)
                .put(admin::update_category)
                .delete(admin::delete_category),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/functions/v1", function_routes())
        .nest("/api", content_routes())
        .nest("/api/admin", admin_routes())
}

/// Build the full application with its middleware stack.
pub fn app(state: AppState) -> Router {
    routes()
        .with_state(state)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(cors_layer())
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
