//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod products;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use shopfront_storefront::config::{self, ConfigError};
use shopfront_storefront::db;
use shopfront_storefront::functions::{FunctionError, MappingError};
use shopfront_storefront::services::IdentityError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Identity service error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Image map error: {0}")]
    Mapping(#[from] MappingError),

    #[error("{0}")]
    Function(#[from] FunctionError),
}

/// Connect to the storefront database using the same variables as the server.
async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let database_url: SecretString = config::get_database_url("STOREFRONT_DATABASE_URL")?;

    tracing::info!("Connecting to storefront database...");
    Ok(db::create_pool(&database_url).await?)
}
