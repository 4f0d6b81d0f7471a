//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::{RemoteConfig, StorefrontConfig};
use crate::content::{BannerService, BlogService, CategoryService, ProductService};
use crate::db::{
    AdminUserRepository, BannerRepository, BlogPostRepository, CategoryRepository,
    PgAdminUserRepository, PgBannerRepository, PgBlogPostRepository, PgCategoryRepository,
    PgProductRepository, ProductRepository,
};
use crate::functions::{AdminProvisioner, ProductImageSync, VideoUploader};
use crate::services::{
    IdentityClient, IdentityError, IdentityProvider, ObjectStorage, StorageClient, StorageError,
};

/// Error wiring the production backends.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("identity client: {0}")]
    Identity(#[from] IdentityError),
    #[error("storage client: {0}")]
    Storage(#[from] StorageError),
}

/// Every store and remote service the application talks to.
#[derive(Clone)]
pub struct Backends {
    pub blog_posts: Arc<dyn BlogPostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub admin_users: Arc<dyn AdminUserRepository>,
    pub banner: Arc<dyn BannerRepository>,
    pub identity: Arc<dyn IdentityProvider>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl Backends {
    /// `PostgreSQL` repositories and REST clients for the hosted services.
    ///
    /// # Errors
    ///
    /// Returns an error if a REST client cannot be built.
    pub fn production(pool: &PgPool, remote: &RemoteConfig) -> Result<Self, BackendError> {
        Ok(Self {
            blog_posts: Arc::new(PgBlogPostRepository::new(pool.clone())),
            categories: Arc::new(PgCategoryRepository::new(pool.clone())),
            products: Arc::new(PgProductRepository::new(pool.clone())),
            admin_users: Arc::new(PgAdminUserRepository::new(pool.clone())),
            banner: Arc::new(PgBannerRepository::new(pool.clone())),
            identity: Arc::new(IdentityClient::new(remote)?),
            storage: Arc::new(StorageClient::new(remote)?),
        })
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration, the services built over [`Backends`] and, when running
/// against `PostgreSQL`, the pool for readiness checks.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: Option<PgPool>,
    backends: Backends,
    blog: BlogService,
    categories: CategoryService,
    products: ProductService,
    banner: BannerService,
    provisioner: AdminProvisioner,
    image_sync: ProductImageSync,
    uploader: VideoUploader,
}

impl AppState {
    /// Create a new application state over the given backends.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: Option<PgPool>, backends: Backends) -> Self {
        let blog = BlogService::new(backends.blog_posts.clone());
        let categories = CategoryService::new(backends.categories.clone());
        let products = ProductService::new(backends.products.clone());
        let banner = BannerService::new(backends.banner.clone());
        let provisioner =
            AdminProvisioner::new(backends.identity.clone(), backends.admin_users.clone());
        let image_sync = ProductImageSync::new(backends.products.clone());
        let uploader = VideoUploader::new(
            backends.storage.clone(),
            backends.products.clone(),
            config.video_bucket.clone(),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                backends,
                blog,
                categories,
                products,
                banner,
                provisioner,
                image_sync,
                uploader,
            }),
        }
    }

    /// Production state: `PostgreSQL` plus the hosted REST services.
    ///
    /// # Errors
    ///
    /// Returns an error if a REST client cannot be built.
    pub fn connect(config: StorefrontConfig, pool: PgPool) -> Result<Self, BackendError> {
        let backends = Backends::production(&pool, &config.remote)?;
        Ok(Self::new(config, Some(pool), backends))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The database pool, absent when running on in-memory backends.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// The identity service.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.backends.identity.as_ref()
    }

    /// The admin role store.
    #[must_use]
    pub fn admin_users(&self) -> &dyn AdminUserRepository {
        self.inner.backends.admin_users.as_ref()
    }

    #[must_use]
    pub fn blog(&self) -> &BlogService {
        &self.inner.blog
    }

    #[must_use]
    pub fn categories(&self) -> &CategoryService {
        &self.inner.categories
    }

    #[must_use]
    pub fn products(&self) -> &ProductService {
        &self.inner.products
    }

    #[must_use]
    pub fn banner(&self) -> &BannerService {
        &self.inner.banner
    }

    #[must_use]
    pub fn provisioner(&self) -> &AdminProvisioner {
        &self.inner.provisioner
    }

    #[must_use]
    pub fn image_sync(&self) -> &ProductImageSync {
        &self.inner.image_sync
    }

    #[must_use]
    pub fn uploader(&self) -> &VideoUploader {
        &self.inner.uploader
    }
}
