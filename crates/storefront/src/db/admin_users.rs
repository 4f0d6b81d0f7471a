//! Admin user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopfront_core::{AdminRole, AdminUser, AdminUserId, IdentityUserId};

use super::{RepositoryError, map_unique_violation};

/// Storage operations on `admin_users`.
#[async_trait]
pub trait AdminUserRepository: Send + Sync {
    /// Find the admin row granted to an identity-service user.
    async fn find_by_user_id(
        &self,
        user_id: IdentityUserId,
    ) -> Result<Option<AdminUser>, RepositoryError>;

    /// Insert an admin row.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] if the user already has one.
    async fn insert(&self, admin: &AdminUser) -> Result<AdminUser, RepositoryError>;
}

#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: AdminUserId,
    user_id: IdentityUserId,
    role: String,
    permissions: Vec<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = RepositoryError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let role: AdminRole = row.role.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("admin_users.role for {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            role,
            permissions: row.permissions.into_iter().collect(),
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

/// `PostgreSQL` implementation of [`AdminUserRepository`].
#[derive(Clone)]
pub struct PgAdminUserRepository {
    pool: PgPool,
}

impl PgAdminUserRepository {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminUserRepository for PgAdminUserRepository {
    async fn find_by_user_id(
        &self,
        user_id: IdentityUserId,
    ) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            r"
            SELECT id, user_id, role, permissions, is_active, created_at
            FROM admin_users
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AdminUser::try_from).transpose()
    }

    async fn insert(&self, admin: &AdminUser) -> Result<AdminUser, RepositoryError> {
        let permissions: Vec<&str> = admin.permissions.iter().map(String::as_str).collect();

        let row = sqlx::query_as::<_, AdminUserRow>(
            r"
            INSERT INTO admin_users (id, user_id, role, permissions, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, role, permissions, is_active, created_at
            ",
        )
        .bind(admin.id)
        .bind(admin.user_id)
        .bind(admin.role.as_str())
        .bind(&permissions)
        .bind(admin.is_active)
        .bind(admin.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "admin user"))?;

        row.try_into()
    }
}
