//! Blog post service.
//!
//! Public reads see active posts only; admin reads and writes see every post.
//! Writes stamp `created_at`/`updated_at` before reaching the repository.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use shopfront_core::{BlogPost, BlogPostDraft, BlogPostId};

use crate::db::{BlogPostRepository, RepositoryError, Visibility};

/// Blog post reads and admin writes.
#[derive(Clone)]
pub struct BlogService {
    repo: Arc<dyn BlogPostRepository>,
}

impl BlogService {
    #[must_use]
    pub fn new(repo: Arc<dyn BlogPostRepository>) -> Self {
        Self { repo }
    }

    /// Active posts, ordered by `display_order` then newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    #[instrument(skip(self))]
    pub async fn list_active_posts(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        self.repo.list(Visibility::ActiveOnly).await
    }

    /// Every post, including inactive drafts.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    #[instrument(skip(self))]
    pub async fn list_all_posts(&self) -> Result<Vec<BlogPost>, RepositoryError> {
        self.repo.list(Visibility::All).await
    }

    /// The active post with this slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    #[instrument(skip(self))]
    pub async fn get_post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, RepositoryError> {
        self.repo.find_by_slug(slug, Visibility::ActiveOnly).await
    }

    /// A post by id, active or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    #[instrument(skip(self))]
    pub async fn get_post_by_id(&self, id: BlogPostId) -> Result<Option<BlogPost>, RepositoryError> {
        self.repo.find_by_id(id).await
    }

    /// Create a post from a draft.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] if the slug is taken.
    #[instrument(skip(self, draft), fields(slug = %draft.slug))]
    pub async fn create_post(&self, draft: BlogPostDraft) -> Result<BlogPost, RepositoryError> {
        let post = draft.into_post(BlogPostId::generate(), Utc::now());
        self.repo.insert(&post).await
    }

    /// Replace a post's editable fields. Returns `None` if the post is gone.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Conflict`] if the new slug is taken.
    #[instrument(skip(self, draft))]
    pub async fn update_post(
        &self,
        id: BlogPostId,
        draft: BlogPostDraft,
    ) -> Result<Option<BlogPost>, RepositoryError> {
        self.repo.update(id, &draft, Utc::now()).await
    }

    /// Delete a post. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    #[instrument(skip(self))]
    pub async fn delete_post(&self, id: BlogPostId) -> Result<bool, RepositoryError> {
        self.repo.delete(id).await
    }
}
