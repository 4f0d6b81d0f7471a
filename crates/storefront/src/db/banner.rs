//! Promotional banner repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopfront_core::{BannerId, PromotionalBanner};

use super::RepositoryError;

/// Read access to `promotional_banner`.
#[async_trait]
pub trait BannerRepository: Send + Sync {
    /// The active banner. When several rows are active the most recently
    /// updated one wins.
    async fn find_active(&self) -> Result<Option<PromotionalBanner>, RepositoryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct BannerRow {
    id: BannerId,
    text: String,
    text_color: String,
    background_color: String,
    is_active: bool,
    animation_speed: f64,
    updated_at: DateTime<Utc>,
}

impl From<BannerRow> for PromotionalBanner {
    fn from(row: BannerRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
            text_color: row.text_color,
            background_color: row.background_color,
            is_active: row.is_active,
            animation_speed: row.animation_speed,
            updated_at: row.updated_at,
        }
    }
}

/// `PostgreSQL` implementation of [`BannerRepository`].
#[derive(Clone)]
pub struct PgBannerRepository {
    pool: PgPool,
}

impl PgBannerRepository {
    /// Create a new banner repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BannerRepository for PgBannerRepository {
    async fn find_active(&self) -> Result<Option<PromotionalBanner>, RepositoryError> {
        let row = sqlx::query_as::<_, BannerRow>(
            r"
            SELECT id, text, text_color, background_color, is_active, animation_speed, updated_at
            FROM promotional_banner
            WHERE is_active
            ORDER BY updated_at DESC
            LIMIT 1
            ",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PromotionalBanner::from))
    }
}
