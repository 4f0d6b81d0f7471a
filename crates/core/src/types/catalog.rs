//! Product catalog: categories and products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};

/// A row of `categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The editable fields of a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl CategoryDraft {
    /// Materialize a new category from this draft, stamped with `now`.
    #[must_use]
    pub fn into_category(self, id: CategoryId, now: DateTime<Utc>) -> Category {
        Category {
            id,
            name: self.name,
            display_order: self.display_order,
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Category {
    /// Overwrite the editable fields with `draft` and stamp `updated_at`.
    #[must_use]
    pub fn with_draft(self, draft: CategoryDraft, now: DateTime<Utc>) -> Self {
        Self {
            name: draft.name,
            display_order: draft.display_order,
            is_active: draft.is_active,
            updated_at: now,
            ..self
        }
    }
}

/// A row of `products`.
///
/// `name` is the lookup key for asset-update jobs but is not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Image URLs, first one is the primary image.
    pub image: Vec<String>,
    pub video_url: Option<String>,
    pub video_thumbnail_url: Option<String>,
    pub has_video: bool,
    pub updated_at: DateTime<Utc>,
}
