//! Database access for the hosted `PostgreSQL` store.
//!
//! # Tables
//!
//! - `blog_posts` - Blog content with structured `detailed_content` (JSONB)
//! - `categories` - Product categories
//! - `products` - Catalog products, patched by the asset functions
//! - `admin_users` - Admin role grants for identity-service users
//! - `promotional_banner` - Site-wide banner
//!
//! Each table is reached through a repository trait so handlers can be tested
//! against in-memory implementations; the `Pg*` types are the production
//! implementations.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p shopfront-cli -- migrate
//! ```

pub mod admin_users;
pub mod banner;
pub mod blog_posts;
pub mod categories;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_users::{AdminUserRepository, PgAdminUserRepository};
pub use banner::{BannerRepository, PgBannerRepository};
pub use blog_posts::{BlogPostRepository, PgBlogPostRepository};
pub use categories::{CategoryRepository, PgCategoryRepository};
pub use products::{PgProductRepository, ProductRepository, VideoAttachment};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Which rows a listing query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only rows with `is_active = true`.
    ActiveOnly,
    /// Every row (admin views).
    All,
}

impl Visibility {
    /// Whether a row with the given active flag is visible.
    #[must_use]
    pub const fn includes(self, is_active: bool) -> bool {
        match self {
            Self::ActiveOnly => is_active,
            Self::All => true,
        }
    }

    /// `true` when only active rows are returned; bound as a SQL parameter.
    const fn active_only(self) -> bool {
        matches!(self, Self::ActiveOnly)
    }
}

/// Map a unique-violation into `RepositoryError::Conflict`.
fn map_unique_violation(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
