//! In-memory backends for tests.
//!
//! Every repository and remote-service trait has a fake here that keeps its
//! state behind a mutex, so tests can seed data, inject failures and inspect
//! what a handler did. [`TestBackends`] bundles one of each and hands out the
//! trait objects the application state expects.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use url::Url;

use shopfront_core::{
    AdminUser, BlogPost, BlogPostDraft, BlogPostId, Category, CategoryDraft, CategoryId, Email,
    IdentityUserId, Product, ProductId, PromotionalBanner, blog_listing_order,
    category_listing_order,
};

use crate::config::{DEFAULT_VIDEO_BUCKET, LogFormat, RemoteConfig, StorefrontConfig};
use crate::db::{
    AdminUserRepository, BannerRepository, BlogPostRepository, CategoryRepository,
    ProductRepository, RepositoryError, VideoAttachment, Visibility,
};
use crate::services::{IdentityError, IdentityProvider, IdentityUser, ObjectStorage, StorageError};
use crate::state::Backends;

/// Setup key accepted by [`test_config`].
pub const TEST_SETUP_KEY: &str = "k7Qz-9vLm2Rx8Tb4Wn6Y";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn injected(what: &str) -> RepositoryError {
    RepositoryError::DataCorruption(format!("injected {what} failure"))
}

/// Configuration pointing at nothing, for use with in-memory backends.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/shopfront_test"),
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 0,
        remote: RemoteConfig {
            base_url: Url::parse("http://remote.test").expect("static URL parses"),
            service_key: SecretString::from("test-service-key"),
        },
        admin_setup_key: SecretString::from(TEST_SETUP_KEY),
        video_bucket: DEFAULT_VIDEO_BUCKET.to_owned(),
        product_image_map_path: None,
        log_format: LogFormat::Pretty,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

// =============================================================================
// Repositories
// =============================================================================

/// In-memory `blog_posts`.
#[derive(Default)]
pub struct MemoryBlogPosts {
    posts: Mutex<Vec<BlogPost>>,
}

impl MemoryBlogPosts {
    /// Seed a post directly, bypassing slug checks.
    pub fn seed(&self, post: BlogPost) {
        lock(&self.posts).push(post);
    }

    /// Number of stored posts.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.posts).len()
    }

    /// Whether no posts are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlogPostRepository for MemoryBlogPosts {
    async fn list(&self, visibility: Visibility) -> Result<Vec<BlogPost>, RepositoryError> {
        let mut posts: Vec<_> = lock(&self.posts)
            .iter()
            .filter(|p| visibility.includes(p.is_active))
            .cloned()
            .collect();
        posts.sort_by(blog_listing_order);
        Ok(posts)
    }

    async fn find_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<BlogPost>, RepositoryError> {
        Ok(lock(&self.posts)
            .iter()
            .filter(|p| p.slug == slug && visibility.includes(p.is_active))
            .max_by_key(|p| (p.is_active, p.updated_at))
            .cloned())
    }

    async fn find_by_id(&self, id: BlogPostId) -> Result<Option<BlogPost>, RepositoryError> {
        Ok(lock(&self.posts).iter().find(|p| p.id == id).cloned())
    }

    async fn insert(&self, post: &BlogPost) -> Result<BlogPost, RepositoryError> {
        let mut posts = lock(&self.posts);
        if post.is_active && posts.iter().any(|p| p.is_active && p.slug == post.slug) {
            return Err(RepositoryError::Conflict(
                "blog post slug already exists".to_owned(),
            ));
        }
        posts.push(post.clone());
        Ok(post.clone())
    }

    async fn update(
        &self,
        id: BlogPostId,
        draft: &BlogPostDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<BlogPost>, RepositoryError> {
        let mut posts = lock(&self.posts);
        if draft.is_active
            && posts
                .iter()
                .any(|p| p.is_active && p.slug == draft.slug && p.id != id)
        {
            return Err(RepositoryError::Conflict(
                "blog post slug already exists".to_owned(),
            ));
        }
        let Some(slot) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        *slot = slot.clone().with_draft(draft.clone(), updated_at);
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: BlogPostId) -> Result<bool, RepositoryError> {
        let mut posts = lock(&self.posts);
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() < before)
    }
}

/// In-memory `categories`.
#[derive(Default)]
pub struct MemoryCategories {
    categories: Mutex<Vec<Category>>,
}

impl MemoryCategories {
    /// Seed a category directly.
    pub fn seed(&self, category: Category) {
        lock(&self.categories).push(category);
    }
}

#[async_trait]
impl CategoryRepository for MemoryCategories {
    async fn list(&self, visibility: Visibility) -> Result<Vec<Category>, RepositoryError> {
        let mut categories: Vec<_> = lock(&self.categories)
            .iter()
            .filter(|c| visibility.includes(c.is_active))
            .cloned()
            .collect();
        categories.sort_by(category_listing_order);
        Ok(categories)
    }

    async fn find_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        Ok(lock(&self.categories).iter().find(|c| c.id == id).cloned())
    }

    async fn insert(&self, category: &Category) -> Result<Category, RepositoryError> {
        lock(&self.categories).push(category.clone());
        Ok(category.clone())
    }

    async fn update(
        &self,
        id: CategoryId,
        draft: &CategoryDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Category>, RepositoryError> {
        let mut categories = lock(&self.categories);
        let Some(slot) = categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        *slot = slot.clone().with_draft(draft.clone(), updated_at);
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let mut categories = lock(&self.categories);
        let before = categories.len();
        categories.retain(|c| c.id != id);
        Ok(categories.len() < before)
    }
}

/// In-memory `products`, kept in insertion order.
#[derive(Default)]
pub struct MemoryProducts {
    products: Mutex<Vec<Product>>,
    failing_names: Mutex<HashSet<String>>,
    fail_video_patch: AtomicBool,
}

impl MemoryProducts {
    /// Seed a product with the given name and no images.
    pub fn seed_named(&self, name: &str) -> ProductId {
        let id = ProductId::generate();
        self.seed(Product {
            id,
            name: name.to_owned(),
            image: Vec::new(),
            video_url: None,
            video_thumbnail_url: None,
            has_video: false,
            updated_at: Utc::now(),
        });
        id
    }

    /// Seed a product directly.
    pub fn seed(&self, product: Product) {
        lock(&self.products).push(product);
    }

    /// Make image updates fail for products with this name.
    pub fn fail_image_updates_for(&self, name: &str) {
        lock(&self.failing_names).insert(name.to_owned());
    }

    /// Make video patches fail.
    pub fn fail_video_patches(&self) {
        self.fail_video_patch.store(true, Ordering::SeqCst);
    }

    /// Snapshot of a stored product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<Product> {
        lock(&self.products).iter().find(|p| p.id == id).cloned()
    }
}

#[async_trait]
impl ProductRepository for MemoryProducts {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut products = lock(&self.products).clone();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.get(id))
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Product>, RepositoryError> {
        Ok(lock(&self.products)
            .iter()
            .filter(|p| p.name == name)
            .cloned()
            .collect())
    }

    async fn update_images(
        &self,
        id: ProductId,
        images: &[String],
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, RepositoryError> {
        let mut products = lock(&self.products);
        let Some(slot) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if lock(&self.failing_names).contains(&slot.name) {
            return Err(injected("image update"));
        }
        slot.image = images.to_vec();
        slot.updated_at = updated_at;
        Ok(Some(slot.clone()))
    }

    async fn attach_video(
        &self,
        id: ProductId,
        attachment: &VideoAttachment,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, RepositoryError> {
        if self.fail_video_patch.load(Ordering::SeqCst) {
            return Err(injected("video patch"));
        }
        let mut products = lock(&self.products);
        let Some(slot) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        slot.video_url = Some(attachment.video_url.clone());
        if attachment.thumbnail_url.is_some() {
            slot.video_thumbnail_url.clone_from(&attachment.thumbnail_url);
        }
        slot.has_video = true;
        slot.updated_at = updated_at;
        Ok(Some(slot.clone()))
    }
}

/// In-memory `admin_users`.
#[derive(Default)]
pub struct MemoryAdminUsers {
    admins: Mutex<Vec<AdminUser>>,
    fail_inserts: AtomicBool,
}

impl MemoryAdminUsers {
    /// Seed an admin row directly.
    pub fn seed(&self, admin: AdminUser) {
        lock(&self.admins).push(admin);
    }

    /// Make every insert fail.
    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }

    /// Number of stored admin rows.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.admins).len()
    }

    /// Whether no admin rows are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AdminUserRepository for MemoryAdminUsers {
    async fn find_by_user_id(
        &self,
        user_id: IdentityUserId,
    ) -> Result<Option<AdminUser>, RepositoryError> {
        Ok(lock(&self.admins)
            .iter()
            .find(|a| a.user_id == user_id)
            .cloned())
    }

    async fn insert(&self, admin: &AdminUser) -> Result<AdminUser, RepositoryError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(injected("admin insert"));
        }
        let mut admins = lock(&self.admins);
        if admins.iter().any(|a| a.user_id == admin.user_id) {
            return Err(RepositoryError::Conflict("admin user already exists".to_owned()));
        }
        admins.push(admin.clone());
        Ok(admin.clone())
    }
}

/// In-memory `promotional_banner`.
#[derive(Default)]
pub struct MemoryBanner {
    banners: Mutex<Vec<PromotionalBanner>>,
}

impl MemoryBanner {
    /// Seed a banner row directly.
    pub fn seed(&self, banner: PromotionalBanner) {
        lock(&self.banners).push(banner);
    }
}

#[async_trait]
impl BannerRepository for MemoryBanner {
    async fn find_active(&self) -> Result<Option<PromotionalBanner>, RepositoryError> {
        Ok(lock(&self.banners)
            .iter()
            .filter(|b| b.is_active)
            .max_by_key(|b| b.updated_at)
            .cloned())
    }
}

// =============================================================================
// Remote services
// =============================================================================

/// Fake identity service with token lookup and call counters.
#[derive(Default)]
pub struct FakeIdentity {
    users: Mutex<Vec<IdentityUser>>,
    tokens: Mutex<HashMap<String, IdentityUserId>>,
    created: AtomicUsize,
    deleted: AtomicUsize,
}

impl FakeIdentity {
    /// Seed a user and return its id.
    pub fn seed_user(&self, email: &str) -> IdentityUserId {
        let id = IdentityUserId::generate();
        lock(&self.users).push(IdentityUser {
            id,
            email: Some(email.to_owned()),
        });
        id
    }

    /// Seed a user reachable through `token`.
    pub fn seed_token(&self, token: &str, email: &str) -> IdentityUserId {
        let id = self.seed_user(email);
        lock(&self.tokens).insert(token.to_owned(), id);
        id
    }

    /// Number of users currently stored.
    #[must_use]
    pub fn user_count(&self) -> usize {
        lock(&self.users).len()
    }

    /// Number of `create_user` calls that succeeded.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Number of `delete_user` calls that succeeded.
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.deleted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn find_user_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<IdentityUser>, IdentityError> {
        Ok(lock(&self.users)
            .iter()
            .find(|u| u.email.as_deref().is_some_and(|e| email.matches(e)))
            .cloned())
    }

    async fn create_user(
        &self,
        email: &Email,
        _password: &SecretString,
    ) -> Result<IdentityUser, IdentityError> {
        let mut users = lock(&self.users);
        if users
            .iter()
            .any(|u| u.email.as_deref().is_some_and(|e| email.matches(e)))
        {
            return Err(IdentityError::Api {
                status: 422,
                message: "A user with this email address has already been registered".to_owned(),
            });
        }
        let user = IdentityUser {
            id: IdentityUserId::generate(),
            email: Some(email.to_string()),
        };
        users.push(user.clone());
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(user)
    }

    async fn delete_user(&self, id: IdentityUserId) -> Result<(), IdentityError> {
        let mut users = lock(&self.users);
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(IdentityError::Api {
                status: 404,
                message: "User not found".to_owned(),
            });
        }
        self.deleted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn user_for_token(&self, token: &str) -> Result<Option<IdentityUser>, IdentityError> {
        let Some(id) = lock(&self.tokens).get(token).copied() else {
            return Ok(None);
        };
        Ok(lock(&self.users).iter().find(|u| u.id == id).cloned())
    }
}

/// Fake object storage that records uploads.
#[derive(Default)]
pub struct FakeStorage {
    objects: Mutex<HashMap<String, (String, usize)>>,
    upload_calls: AtomicUsize,
}

impl FakeStorage {
    fn key(bucket: &str, path: &str) -> String {
        format!("{bucket}/{path}")
    }

    /// Number of `upload` calls, successful or not.
    #[must_use]
    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    /// Keys (`bucket/path`) of stored objects, sorted.
    #[must_use]
    pub fn object_keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = lock(&self.objects).keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Content type and size of a stored object.
    #[must_use]
    pub fn object(&self, bucket: &str, path: &str) -> Option<(String, usize)> {
        lock(&self.objects).get(&Self::key(bucket, path)).cloned()
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), StorageError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let mut objects = lock(&self.objects);
        let key = Self::key(bucket, path);
        if objects.contains_key(&key) {
            return Err(StorageError::Api {
                status: 409,
                message: "The resource already exists".to_owned(),
            });
        }
        objects.insert(key, (content_type.to_owned(), bytes.len()));
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("http://remote.test/storage/v1/object/public/{bucket}/{path}")
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), StorageError> {
        let mut objects = lock(&self.objects);
        for path in paths {
            objects.remove(&Self::key(bucket, path));
        }
        Ok(())
    }
}

// =============================================================================
// Bundle
// =============================================================================

/// One of each in-memory backend, with typed handles for inspection.
#[derive(Clone, Default)]
pub struct TestBackends {
    pub blog_posts: Arc<MemoryBlogPosts>,
    pub categories: Arc<MemoryCategories>,
    pub products: Arc<MemoryProducts>,
    pub admin_users: Arc<MemoryAdminUsers>,
    pub banner: Arc<MemoryBanner>,
    pub identity: Arc<FakeIdentity>,
    pub storage: Arc<FakeStorage>,
}

impl TestBackends {
    /// Create empty backends.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trait-object handles for [`crate::state::AppState`].
    #[must_use]
    pub fn backends(&self) -> Backends {
        Backends {
            blog_posts: self.blog_posts.clone(),
            categories: self.categories.clone(),
            products: self.products.clone(),
            admin_users: self.admin_users.clone(),
            banner: self.banner.clone(),
            identity: self.identity.clone(),
            storage: self.storage.clone(),
        }
    }
}
