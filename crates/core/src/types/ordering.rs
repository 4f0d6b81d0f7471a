//! Listing order for read-model queries.
//!
//! The SQL repositories express these as `ORDER BY` clauses; the comparators
//! here are the reference used by in-memory stores and by tests.

use std::cmp::Ordering;

use super::blog::BlogPost;
use super::catalog::Category;

/// Blog listing order: `display_order` ascending, then `published_date`
/// descending (newest first among equals).
#[must_use]
pub fn blog_listing_order(a: &BlogPost, b: &BlogPost) -> Ordering {
    a.display_order
        .cmp(&b.display_order)
        .then_with(|| b.published_date.cmp(&a.published_date))
}

/// Category listing order: `display_order` ascending, then `name` ascending.
#[must_use]
pub fn category_listing_order(a: &Category, b: &Category) -> Ordering {
    a.display_order
        .cmp(&b.display_order)
        .then_with(|| a.name.cmp(&b.name))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::{BlogPostDraft, BlogPostId, CategoryDraft, CategoryId};

    fn post(slug: &str, order: i32, date: &str) -> BlogPost {
        BlogPostDraft {
            slug: slug.to_owned(),
            title: slug.to_owned(),
            detailed_title: None,
            author: None,
            category_tag: None,
            published_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            display_order: order,
            is_active: true,
            detailed_content: Vec::new(),
        }
        .into_post(BlogPostId::generate(), Utc::now())
    }

    fn category(name: &str, order: i32) -> Category {
        CategoryDraft {
            name: name.to_owned(),
            display_order: order,
            is_active: true,
        }
        .into_category(CategoryId::generate(), Utc::now())
    }

    #[test]
    fn test_blog_order_is_display_order_then_newest() {
        let mut posts = vec![
            post("old-first", 1, "2024-01-01"),
            post("second", 2, "2025-06-01"),
            post("new-first", 1, "2024-09-15"),
        ];
        posts.sort_by(blog_listing_order);

        let slugs: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["new-first", "old-first", "second"]);

        for pair in posts.windows(2) {
            let [a, b] = pair else { unreachable!() };
            assert!(a.display_order <= b.display_order);
            if a.display_order == b.display_order {
                assert!(a.published_date >= b.published_date);
            }
        }
    }

    #[test]
    fn test_category_order() {
        let mut categories = vec![category("A", 2), category("B", 1)];
        categories.sort_by(category_listing_order);
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
    }
}
