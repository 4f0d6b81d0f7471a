//! Database migration command.
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded at
//! compile time.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use super::{CliError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
