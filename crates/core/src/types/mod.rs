//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers and entities for the storefront's
//! domain: blog content, the product catalog, admins and the promotional banner.

pub mod admin;
pub mod banner;
pub mod blog;
pub mod catalog;
pub mod content_block;
pub mod email;
pub mod id;
pub mod ordering;

pub use admin::{AdminRole, AdminRoleParseError, AdminUser, DEFAULT_ADMIN_PERMISSIONS};
pub use banner::PromotionalBanner;
pub use blog::{BlogPost, BlogPostDraft};
pub use catalog::{Category, CategoryDraft, Product};
pub use content_block::ContentBlock;
pub use email::{Email, EmailError};
pub use id::*;
pub use ordering::{blog_listing_order, category_listing_order};
