//! Category repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopfront_core::{Category, CategoryDraft, CategoryId};

use super::{RepositoryError, Visibility, map_unique_violation};

/// Storage operations on `categories`.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// List categories ordered by `display_order`, then name.
    async fn list(&self, visibility: Visibility) -> Result<Vec<Category>, RepositoryError>;

    /// Find a category by id.
    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError>;

    /// Insert a fully-formed category.
    async fn insert(&self, category: &Category) -> Result<Category, RepositoryError>;

    /// Replace the editable fields and set `updated_at`.
    async fn update(
        &self,
        id: CategoryId,
        draft: &CategoryDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Category>, RepositoryError>;

    /// Delete a category. Returns whether a row was removed.
    async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    display_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            display_order: row.display_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `PostgreSQL` implementation of [`CategoryRepository`].
#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn list(&self, visibility: Visibility) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, display_order, is_active, created_at, updated_at
            FROM categories
            WHERE ($1 = FALSE OR is_active)
            ORDER BY display_order ASC, name ASC
            ",
        )
        .bind(visibility.active_only())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, display_order, is_active, created_at, updated_at
            FROM categories
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Category::from))
    }

    async fn insert(&self, category: &Category) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO categories (id, name, display_order, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, display_order, is_active, created_at, updated_at
            ",
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(category.display_order)
        .bind(category.is_active)
        .bind(category.created_at)
        .bind(category.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "category"))?;

        Ok(row.into())
    }

    async fn update(
        &self,
        id: CategoryId,
        draft: &CategoryDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            UPDATE categories
            SET name = $2, display_order = $3, is_active = $4, updated_at = $5
            WHERE id = $1
            RETURNING id, name, display_order, is_active, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(draft.display_order)
        .bind(draft.is_active)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "category"))?;

        Ok(row.map(Category::from))
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
