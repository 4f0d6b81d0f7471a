//! Blog posts.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::content_block::ContentBlock;
use super::id::BlogPostId;

/// A row of `blog_posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: BlogPostId,
    /// URL slug, unique among active posts.
    pub slug: String,
    pub title: String,
    pub detailed_title: Option<String>,
    pub author: Option<String>,
    pub category_tag: Option<String>,
    pub published_date: NaiveDate,
    pub display_order: i32,
    pub is_active: bool,
    pub detailed_content: Vec<ContentBlock>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The editable fields of a blog post, used for both inserts and updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPostDraft {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub detailed_title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub category_tag: Option<String>,
    pub published_date: NaiveDate,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub detailed_content: Vec<ContentBlock>,
}

const fn default_active() -> bool {
    true
}

impl BlogPostDraft {
    /// Materialize a new post from this draft, stamped with `now`.
    #[must_use]
    pub fn into_post(self, id: BlogPostId, now: DateTime<Utc>) -> BlogPost {
        BlogPost {
            id,
            slug: self.slug,
            title: self.title,
            detailed_title: self.detailed_title,
            author: self.author,
            category_tag: self.category_tag,
            published_date: self.published_date,
            display_order: self.display_order,
            is_active: self.is_active,
            detailed_content: self.detailed_content,
            created_at: now,
            updated_at: now,
        }
    }
}

impl BlogPost {
    /// Overwrite the editable fields with `draft`, keeping id and creation
    /// time, and stamp `updated_at`.
    #[must_use]
    pub fn with_draft(self, draft: BlogPostDraft, now: DateTime<Utc>) -> Self {
        let mut updated = draft.into_post(self.id, self.created_at);
        updated.updated_at = now;
        updated
    }
}
