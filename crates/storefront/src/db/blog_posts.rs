//! Blog post repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;

use shopfront_core::{BlogPost, BlogPostDraft, BlogPostId, ContentBlock};

use super::{RepositoryError, Visibility, map_unique_violation};

/// Storage operations on `blog_posts`.
///
/// List operations return rows in listing order (see
/// [`shopfront_core::blog_listing_order`]).
#[async_trait]
pub trait BlogPostRepository: Send + Sync {
    /// List posts in listing order.
    async fn list(&self, visibility: Visibility) -> Result<Vec<BlogPost>, RepositoryError>;

    /// Find a post by slug. Returns `None` when no visible post has this slug.
    async fn find_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<BlogPost>, RepositoryError>;

    /// Find a post by id, active or not.
    async fn find_by_id(&self, id: BlogPostId) -> Result<Option<BlogPost>, RepositoryError>;

    /// Insert a fully-formed post.
    async fn insert(&self, post: &BlogPost) -> Result<BlogPost, RepositoryError>;

    /// Replace the editable fields of a post and set `updated_at`.
    /// Returns `None` if no post has this id.
    async fn update(
        &self,
        id: BlogPostId,
        draft: &BlogPostDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<BlogPost>, RepositoryError>;

    /// Delete a post. Returns whether a row was removed.
    async fn delete(&self, id: BlogPostId) -> Result<bool, RepositoryError>;
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct BlogPostRow {
    id: BlogPostId,
    slug: String,
    title: String,
    detailed_title: Option<String>,
    author: Option<String>,
    category_tag: Option<String>,
    published_date: NaiveDate,
    display_order: i32,
    is_active: bool,
    detailed_content: Option<Json<Value>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BlogPostRow> for BlogPost {
    fn from(row: BlogPostRow) -> Self {
        Self {
            id: row.id,
            slug: row.slug,
            title: row.title,
            detailed_title: row.detailed_title,
            author: row.author,
            category_tag: row.category_tag,
            published_date: row.published_date,
            display_order: row.display_order,
            is_active: row.is_active,
            detailed_content: row
                .detailed_content
                .map(|Json(value)| ContentBlock::decode_all(value))
                .unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "id, slug, title, detailed_title, author, category_tag, published_date, \
                       display_order, is_active, detailed_content, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// `PostgreSQL` implementation of [`BlogPostRepository`].
#[derive(Clone)]
pub struct PgBlogPostRepository {
    pool: PgPool,
}

impl PgBlogPostRepository {
    /// Create a new blog post repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlogPostRepository for PgBlogPostRepository {
    async fn list(&self, visibility: Visibility) -> Result<Vec<BlogPost>, RepositoryError> {
        let rows = sqlx::query_as::<_, BlogPostRow>(&format!(
            "SELECT {COLUMNS} FROM blog_posts \
             WHERE ($1 = FALSE OR is_active) \
             ORDER BY display_order ASC, published_date DESC"
        ))
        .bind(visibility.active_only())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BlogPost::from).collect())
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<BlogPost>, RepositoryError> {
        let row = sqlx::query_as::<_, BlogPostRow>(&format!(
            "SELECT {COLUMNS} FROM blog_posts \
             WHERE slug = $1 AND ($2 = FALSE OR is_active) \
             ORDER BY is_active DESC, updated_at DESC \
             LIMIT 1"
        ))
        .bind(slug)
        .bind(visibility.active_only())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BlogPost::from))
    }

    async fn find_by_id(&self, id: BlogPostId) -> Result<Option<BlogPost>, RepositoryError> {
        let row = sqlx::query_as::<_, BlogPostRow>(&format!(
            "SELECT {COLUMNS} FROM blog_posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(BlogPost::from))
    }

    async fn insert(&self, post: &BlogPost) -> Result<BlogPost, RepositoryError> {
        let row = sqlx::query_as::<_, BlogPostRow>(&format!(
            "INSERT INTO blog_posts ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        ))
        .bind(post.id)
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.detailed_title)
        .bind(&post.author)
        .bind(&post.category_tag)
        .bind(post.published_date)
        .bind(post.display_order)
        .bind(post.is_active)
        .bind(Json(ContentBlock::encode_all(&post.detailed_content)))
        .bind(post.created_at)
        .bind(post.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "blog post slug"))?;

        Ok(row.into())
    }

    async fn update(
        &self,
        id: BlogPostId,
        draft: &BlogPostDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<BlogPost>, RepositoryError> {
        let row = sqlx::query_as::<_, BlogPostRow>(&format!(
            "UPDATE blog_posts SET \
                slug = $2, title = $3, detailed_title = $4, author = $5, category_tag = $6, \
                published_date = $7, display_order = $8, is_active = $9, \
                detailed_content = $10, updated_at = $11 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.slug)
        .bind(&draft.title)
        .bind(&draft.detailed_title)
        .bind(&draft.author)
        .bind(&draft.category_tag)
        .bind(draft.published_date)
        .bind(draft.display_order)
        .bind(draft.is_active)
        .bind(Json(ContentBlock::encode_all(&draft.detailed_content)))
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "blog post slug"))?;

        Ok(row.map(BlogPost::from))
    }

    async fn delete(&self, id: BlogPostId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
