//! Public read-model handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use shopfront_core::{BlogPost, Category, Product, ProductId, PromotionalBanner};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Active blog posts in listing order.
#[instrument(skip(state))]
pub async fn list_blog_posts(State(state): State<AppState>) -> Result<Json<Vec<BlogPost>>> {
    Ok(Json(state.blog().list_active_posts().await?))
}

/// One active blog post.
#[instrument(skip(state))]
pub async fn show_blog_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>> {
    state
        .blog()
        .get_post_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("blog post {slug}")))
}

/// Active categories in listing order.
#[instrument(skip(state))]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.categories().list_active_categories().await?))
}

/// All products ordered by name.
#[instrument(skip(state))]
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.products().list_products().await?))
}

/// One product.
#[instrument(skip(state))]
pub async fn show_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    state
        .products()
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// The active banner, or `null`.
#[instrument(skip(state))]
pub async fn promotional_banner(
    State(state): State<AppState>,
) -> Result<Json<Option<PromotionalBanner>>> {
    Ok(Json(state.banner().active_banner().await?))
}
