//! Shopfront storefront server.
//!
//! Serves the read-model API and the function endpoints on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework, JSON only
//! - `PostgreSQL` for store content, products and admin roles
//! - Hosted identity service for users and access tokens
//! - Hosted object storage for product videos
//!
//! Migrations are NOT run on startup. Run them explicitly via:
//! `cargo run -p shopfront-cli -- migrate`

#![cfg_attr(not(test), forbid(unsafe_code))]

use shopfront_storefront::config::StorefrontConfig;
use shopfront_storefront::state::AppState;
use shopfront_storefront::{app, db, telemetry};

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing(config.log_format);

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    let addr = config.socket_addr();
    let state = AppState::connect(config, pool).expect("Failed to initialize application state");
    let app = app(state);

    tracing::info!("storefront listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
