//! Category, product and banner services.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use shopfront_core::{Category, CategoryDraft, CategoryId, Product, ProductId, PromotionalBanner};

use crate::db::{
    BannerRepository, CategoryRepository, ProductRepository, RepositoryError, Visibility,
};

/// Category reads and admin writes.
#[derive(Clone)]
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    #[must_use]
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// Active categories ordered by `display_order`, then name.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    #[instrument(skip(self))]
    pub async fn list_active_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        self.repo.list(Visibility::ActiveOnly).await
    }

    /// Every category.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    #[instrument(skip(self))]
    pub async fn list_all_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        self.repo.list(Visibility::All).await
    }

    /// # Errors
    ///
    /// Returns an error if the store query fails.
    #[instrument(skip(self))]
    pub async fn get_category_by_id(
        &self,
        id: CategoryId,
    ) -> Result<Option<Category>, RepositoryError> {
        self.repo.find_by_id(id).await
    }

    /// # Errors
    ///
    /// Returns an error if the insert fails.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_category(&self, draft: CategoryDraft) -> Result<Category, RepositoryError> {
        let category = draft.into_category(CategoryId::generate(), Utc::now());
        self.repo.insert(&category).await
    }

    /// # Errors
    ///
    /// Returns an error if the update fails.
    #[instrument(skip(self, draft))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        draft: CategoryDraft,
    ) -> Result<Option<Category>, RepositoryError> {
        self.repo.update(id, &draft, Utc::now()).await
    }

    /// # Errors
    ///
    /// Returns an error if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        self.repo.delete(id).await
    }
}

/// Product reads.
#[derive(Clone)]
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
}

impl ProductService {
    #[must_use]
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    /// All products ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        self.repo.list().await
    }

    /// # Errors
    ///
    /// Returns an error if the store query fails.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.repo.find_by_id(id).await
    }
}

/// Promotional banner reads.
#[derive(Clone)]
pub struct BannerService {
    repo: Arc<dyn BannerRepository>,
}

impl BannerService {
    #[must_use]
    pub fn new(repo: Arc<dyn BannerRepository>) -> Self {
        Self { repo }
    }

    /// The banner to display, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    #[instrument(skip(self))]
    pub async fn active_banner(&self) -> Result<Option<PromotionalBanner>, RepositoryError> {
        self.repo.find_active().await
    }
}
