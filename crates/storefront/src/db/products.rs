//! Product repository.
//!
//! Only the columns the storefront reads or patches are mapped; catalog
//! management (prices, stock, descriptions) lives elsewhere.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopfront_core::{Product, ProductId};

use super::RepositoryError;

/// Video columns written after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoAttachment {
    pub video_url: String,
    pub thumbnail_url: Option<String>,
}

/// Storage operations on `products`.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// List all products ordered by name.
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Find a product by id.
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// All products whose name equals `name` exactly, oldest first.
    async fn find_by_name(&self, name: &str) -> Result<Vec<Product>, RepositoryError>;

    /// Replace a product's image list. Returns `None` if the product is gone.
    async fn update_images(
        &self,
        id: ProductId,
        images: &[String],
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, RepositoryError>;

    /// Record an uploaded video and set `has_video`.
    async fn attach_video(
        &self,
        id: ProductId,
        attachment: &VideoAttachment,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, RepositoryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    image: Option<Vec<String>>,
    video_url: Option<String>,
    video_thumbnail_url: Option<String>,
    has_video: bool,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image: row.image.unwrap_or_default(),
            video_url: row.video_url,
            video_thumbnail_url: row.video_thumbnail_url,
            has_video: row.has_video,
            updated_at: row.updated_at,
        }
    }
}

/// `PostgreSQL` implementation of [`ProductRepository`].
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, image, video_url, video_thumbnail_url, has_video, updated_at
            FROM products
            ORDER BY name ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, image, video_url, video_thumbnail_url, has_video, updated_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, image, video_url, video_thumbnail_url, has_video, updated_at
            FROM products
            WHERE name = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn update_images(
        &self,
        id: ProductId,
        images: &[String],
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE products
            SET image = $2, updated_at = $3
            WHERE id = $1
            RETURNING id, name, image, video_url, video_thumbnail_url, has_video, updated_at
            ",
        )
        .bind(id)
        .bind(images)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn attach_video(
        &self,
        id: ProductId,
        attachment: &VideoAttachment,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE products
            SET video_url = $2, video_thumbnail_url = $3, has_video = TRUE, updated_at = $4
            WHERE id = $1
            RETURNING id, name, image, video_url, video_thumbnail_url, has_video, updated_at
            ",
        )
        .bind(id)
        .bind(&attachment.video_url)
        .bind(&attachment.thumbnail_url)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }
}
