//! Integration tests for the admin CRUD API under `/api/admin`.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Utc;
use serde_json::{Value, json};

use shopfront_core::{AdminRole, AdminUser};
use shopfront_integration_tests::TestApp;
use shopfront_storefront::testing::TestBackends;

const ADMIN_TOKEN: &str = "tok-admin";
const VIEWER_TOKEN: &str = "tok-viewer";
const SHOPPER_TOKEN: &str = "tok-shopper";

/// An app with a full admin, a viewer without permissions, and a plain user.
fn app_with_users() -> TestApp {
    let backends = TestBackends::new();
    let now = Utc::now();

    let admin_id = backends.identity.seed_token(ADMIN_TOKEN, "owner@example.com");
    backends.admin_users.seed(AdminUser::new_default(admin_id, now));

    let viewer_id = backends.identity.seed_token(VIEWER_TOKEN, "viewer@example.com");
    backends.admin_users.seed(AdminUser {
        role: AdminRole::Viewer,
        permissions: BTreeSet::new(),
        ..AdminUser::new_default(viewer_id, now)
    });

    backends.identity.seed_token(SHOPPER_TOKEN, "shopper@example.com");
    TestApp::with_backends(backends)
}

fn draft(slug: &str) -> Value {
    json!({
        "slug": slug,
        "title": "Summer skincare",
        "published_date": "2024-06-01",
        "detailed_content": [
            { "type": "heading", "content": "Why SPF", "level": 2 },
            { "type": "paragraph", "content": "Every day, all year." }
        ]
    })
}

// =============================================================================
// Authorization
// =============================================================================

#[tokio::test]
async fn test_admin_routes_require_token() {
    let app = app_with_users();

    let res = app
        .json(Method::GET, "/api/admin/blog-posts", None, None)
        .await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert!(res.body["error"].is_string());
}

#[tokio::test]
async fn test_admin_routes_reject_unknown_token() {
    let app = app_with_users();

    let res = app
        .json(Method::GET, "/api/admin/blog-posts", Some("tok-bogus"), None)
        .await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_forbid_non_admins() {
    let app = app_with_users();

    let res = app
        .json(Method::GET, "/api/admin/categories", Some(SHOPPER_TOKEN), None)
        .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_routes_check_permissions() {
    let app = app_with_users();

    let res = app
        .json(
            Method::POST,
            "/api/admin/blog-posts",
            Some(VIEWER_TOKEN),
            Some(&draft("viewer-post")),
        )
        .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert!(app.backends.blog_posts.is_empty());
}

// =============================================================================
// Blog posts
// =============================================================================

#[tokio::test]
async fn test_blog_post_lifecycle() {
    let app = app_with_users();

    let created = app
        .json(
            Method::POST,
            "/api/admin/blog-posts",
            Some(ADMIN_TOKEN),
            Some(&draft("summer-skincare")),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["is_active"], true);
    assert_eq!(created.body["detailed_content"][0]["type"], "heading");
    let id = created.body["id"].as_str().unwrap().to_owned();

    let mut update = draft("summer-skincare");
    update["title"] = json!("Summer skincare, revised");
    update["is_active"] = json!(false);
    let updated = app
        .json(
            Method::PUT,
            &format!("/api/admin/blog-posts/{id}"),
            Some(ADMIN_TOKEN),
            Some(&update),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["title"], "Summer skincare, revised");

    // Inactive posts stay visible to admins only.
    let public = app.get("/api/blog-posts/summer-skincare").await;
    assert_eq!(public.status, StatusCode::NOT_FOUND);
    let all = app
        .json(Method::GET, "/api/admin/blog-posts", Some(ADMIN_TOKEN), None)
        .await;
    assert_eq!(all.body.as_array().unwrap().len(), 1);

    let deleted = app
        .json(
            Method::DELETE,
            &format!("/api/admin/blog-posts/{id}"),
            Some(ADMIN_TOKEN),
            None,
        )
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert!(app.backends.blog_posts.is_empty());
}

#[tokio::test]
async fn test_duplicate_slug_conflicts() {
    let app = app_with_users();

    let first = app
        .json(
            Method::POST,
            "/api/admin/blog-posts",
            Some(ADMIN_TOKEN),
            Some(&draft("same-slug")),
        )
        .await;
    let second = app
        .json(
            Method::POST,
            "/api/admin/blog-posts",
            Some(ADMIN_TOKEN),
            Some(&draft("same-slug")),
        )
        .await;

    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(app.backends.blog_posts.len(), 1);
}

#[tokio::test]
async fn test_blog_post_requires_title() {
    let app = app_with_users();
    let mut body = draft("untitled");
    body["title"] = json!("  ");

    let res = app
        .json(
            Method::POST,
            "/api/admin/blog-posts",
            Some(ADMIN_TOKEN),
            Some(&body),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_is_json_bad_request() {
    let app = app_with_users();

    let res = app
        .send(
            Request::post("/api/admin/categories")
                .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"name\": "))
                .unwrap(),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["error"].is_string());

    let missing_field = app
        .json(
            Method::POST,
            "/api/admin/blog-posts",
            Some(ADMIN_TOKEN),
            Some(&json!({ "title": "No slug or date" })),
        )
        .await;
    assert_eq!(missing_field.status, StatusCode::BAD_REQUEST);
    assert!(missing_field.body["error"].is_string());
    assert!(app.backends.blog_posts.is_empty());
}

#[tokio::test]
async fn test_delete_unknown_blog_post_is_not_found() {
    let app = app_with_users();

    let res = app
        .json(
            Method::DELETE,
            &format!("/api/admin/blog-posts/{}", shopfront_core::BlogPostId::generate()),
            Some(ADMIN_TOKEN),
            None,
        )
        .await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Categories
// =============================================================================

#[tokio::test]
async fn test_category_lifecycle() {
    let app = app_with_users();

    let created = app
        .json(
            Method::POST,
            "/api/admin/categories",
            Some(ADMIN_TOKEN),
            Some(&json!({ "name": "Body Care", "display_order": 3 })),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["id"].as_str().unwrap().to_owned();

    let updated = app
        .json(
            Method::PUT,
            &format!("/api/admin/categories/{id}"),
            Some(ADMIN_TOKEN),
            Some(&json!({ "name": "Body & Bath", "display_order": 1, "is_active": true })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["name"], "Body & Bath");

    let public = app.get("/api/categories").await;
    assert_eq!(public.body[0]["name"], "Body & Bath");

    let deleted = app
        .json(
            Method::DELETE,
            &format!("/api/admin/categories/{id}"),
            Some(ADMIN_TOKEN),
            None,
        )
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert!(app.get("/api/categories").await.body.as_array().unwrap().is_empty());
}
