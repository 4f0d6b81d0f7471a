//! Admin CRUD handlers for blog posts and categories.
//!
//! Every handler takes [`RequireAdmin`], then checks the permission for the
//! resource it touches.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::instrument;

use shopfront_core::{
    AdminUser, BlogPost, BlogPostDraft, BlogPostId, Category, CategoryDraft, CategoryId,
};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

const MANAGE_BLOG: &str = "manage_blog";
const MANAGE_CATEGORIES: &str = "manage_categories";

fn require_permission(admin: &AdminUser, permission: &str) -> Result<()> {
    if admin.has_permission(permission) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("missing permission {permission}")))
    }
}

/// Unwrap a JSON body, reporting a malformed one as a JSON `400`.
fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

fn validate_post(draft: &BlogPostDraft) -> Result<()> {
    if draft.slug.trim().is_empty() || draft.title.trim().is_empty() {
        return Err(AppError::BadRequest("slug and title are required".to_string()));
    }
    Ok(())
}

fn validate_category(draft: &CategoryDraft) -> Result<()> {
    if draft.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    Ok(())
}

// =============================================================================
// Blog posts
// =============================================================================

#[instrument(skip_all)]
pub async fn list_blog_posts(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<BlogPost>>> {
    require_permission(&admin, MANAGE_BLOG)?;
    Ok(Json(state.blog().list_all_posts().await?))
}

#[instrument(skip(state, admin))]
pub async fn show_blog_post(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<BlogPostId>,
) -> Result<Json<BlogPost>> {
    require_permission(&admin, MANAGE_BLOG)?;
    state
        .blog()
        .get_post_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("blog post {id}")))
}

#[instrument(skip_all)]
pub async fn create_blog_post(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    draft: std::result::Result<Json<BlogPostDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<BlogPost>)> {
    require_permission(&admin, MANAGE_BLOG)?;
    let draft = json_body(draft)?;
    validate_post(&draft)?;
    let post = state.blog().create_post(draft).await?;
    tracing::info!(post_id = %post.id, "Blog post created");
    Ok((StatusCode::CREATED, Json(post)))
}

#[instrument(skip(state, admin, draft))]
pub async fn update_blog_post(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<BlogPostId>,
    draft: std::result::Result<Json<BlogPostDraft>, JsonRejection>,
) -> Result<Json<BlogPost>> {
    require_permission(&admin, MANAGE_BLOG)?;
    let draft = json_body(draft)?;
    validate_post(&draft)?;
    state
        .blog()
        .update_post(id, draft)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("blog post {id}")))
}

#[instrument(skip(state, admin))]
pub async fn delete_blog_post(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<BlogPostId>,
) -> Result<StatusCode> {
    require_permission(&admin, MANAGE_BLOG)?;
    if state.blog().delete_post(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("blog post {id}")))
    }
}

// =============================================================================
// Categories
// =============================================================================

#[instrument(skip_all)]
pub async fn list_categories(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<Json<Vec<Category>>> {
    require_permission(&admin, MANAGE_CATEGORIES)?;
    Ok(Json(state.categories().list_all_categories().await?))
}

#[instrument(skip(state, admin))]
pub async fn show_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>> {
    require_permission(&admin, MANAGE_CATEGORIES)?;
    state
        .categories()
        .get_category_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))
}

#[instrument(skip_all)]
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    draft: std::result::Result<Json<CategoryDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>)> {
    require_permission(&admin, MANAGE_CATEGORIES)?;
    let draft = json_body(draft)?;
    validate_category(&draft)?;
    let category = state.categories().create_category(draft).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(state, admin, draft))]
pub async fn update_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CategoryId>,
    draft: std::result::Result<Json<CategoryDraft>, JsonRejection>,
) -> Result<Json<Category>> {
    require_permission(&admin, MANAGE_CATEGORIES)?;
    let draft = json_body(draft)?;
    validate_category(&draft)?;
    state
        .categories()
        .update_category(id, draft)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))
}

#[instrument(skip(state, admin))]
pub async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    require_permission(&admin, MANAGE_CATEGORIES)?;
    if state.categories().delete_category(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("category {id}")))
    }
}
