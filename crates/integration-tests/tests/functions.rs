//! Integration tests for the function endpoints under `/functions/v1`.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::json;

use shopfront_integration_tests::{MultipartBody, TEST_SETUP_KEY, TestApp};
use shopfront_storefront::functions::{MAX_THUMBNAIL_BYTES, MAX_VIDEO_BYTES};
use shopfront_storefront::testing::TestBackends;

const ADD_ADMIN: &str = "/functions/v1/add-admin";
const UPDATE_IMAGES: &str = "/functions/v1/update-product-images";
const UPLOAD_VIDEO: &str = "/functions/v1/upload-product-video";

fn admin_request(email: &str, setup_key: &str) -> serde_json::Value {
    json!({
        "email": email,
        "password": "hunter22",
        "setupKey": setup_key,
    })
}

// =============================================================================
// add-admin
// =============================================================================

#[tokio::test]
async fn test_add_admin_creates_user_and_grants_role() {
    let app = TestApp::new();

    let res = app
        .json(
            Method::POST,
            ADD_ADMIN,
            None,
            Some(&admin_request("owner@example.com", TEST_SETUP_KEY)),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["message"], "Admin user created successfully");
    assert_eq!(res.body["admin"]["email"], "owner@example.com");
    assert_eq!(res.body["admin"]["role"], "admin");
    assert_eq!(app.backends.identity.created_count(), 1);
    assert_eq!(app.backends.admin_users.len(), 1);
}

#[tokio::test]
async fn test_add_admin_is_idempotent() {
    let app = TestApp::new();
    let body = admin_request("owner@example.com", TEST_SETUP_KEY);

    let first = app.json(Method::POST, ADD_ADMIN, None, Some(&body)).await;
    let second = app.json(Method::POST, ADD_ADMIN, None, Some(&body)).await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["message"], "User is already an admin");
    assert_eq!(first.body["admin"]["id"], second.body["admin"]["id"]);
    assert_eq!(app.backends.identity.created_count(), 1);
    assert_eq!(app.backends.admin_users.len(), 1);
}

#[tokio::test]
async fn test_add_admin_reuses_existing_identity_user() {
    let backends = TestBackends::new();
    let user_id = backends.identity.seed_user("owner@example.com");
    let app = TestApp::with_backends(backends);

    let res = app
        .json(
            Method::POST,
            ADD_ADMIN,
            None,
            Some(&admin_request("owner@example.com", TEST_SETUP_KEY)),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["admin"]["id"], user_id.to_string());
    assert_eq!(app.backends.identity.created_count(), 0);
    assert_eq!(app.backends.admin_users.len(), 1);
}

#[tokio::test]
async fn test_add_admin_rejects_wrong_setup_key_without_side_effects() {
    let app = TestApp::new();

    let res = app
        .json(
            Method::POST,
            ADD_ADMIN,
            None,
            Some(&admin_request("owner@example.com", "not-the-key")),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["success"], false);
    assert_eq!(res.body["error"], "Invalid setup key");
    assert_eq!(app.backends.identity.user_count(), 0);
    assert!(app.backends.admin_users.is_empty());
}

#[tokio::test]
async fn test_add_admin_requires_all_fields() {
    let app = TestApp::new();

    let res = app
        .json(
            Method::POST,
            ADD_ADMIN,
            None,
            Some(&json!({ "email": "owner@example.com" })),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["success"], false);
    assert!(res.body["error"].as_str().unwrap().contains("Missing required fields"));
}

#[tokio::test]
async fn test_add_admin_rejects_malformed_json() {
    let app = TestApp::new();

    let res = app
        .send(
            axum::http::Request::post(ADD_ADMIN)
                .header("content-type", "application/json")
                .body(axum::body::Body::from("{not json"))
                .unwrap(),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["success"], false);
}

#[tokio::test]
async fn test_add_admin_removes_created_user_when_grant_fails() {
    let backends = TestBackends::new();
    backends.admin_users.fail_inserts();
    let app = TestApp::with_backends(backends);

    let res = app
        .json(
            Method::POST,
            ADD_ADMIN,
            None,
            Some(&admin_request("owner@example.com", TEST_SETUP_KEY)),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.backends.identity.created_count(), 1);
    assert_eq!(app.backends.identity.deleted_count(), 1);
    assert_eq!(app.backends.identity.user_count(), 0);
}

// =============================================================================
// update-product-images
// =============================================================================

#[tokio::test]
async fn test_update_images_counts_every_entry() {
    let backends = TestBackends::new();
    let scrub = backends.products.seed_named("Mango Sugar Scrub");
    backends.products.seed_named("Coconut Milk Shampoo");
    backends.products.fail_image_updates_for("Coconut Milk Shampoo");
    let app = TestApp::with_backends(backends);

    let res = app.json(Method::POST, UPDATE_IMAGES, None, None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["updated"], 1);
    assert_eq!(res.body["skipped"], 4);
    let errors = res.body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().starts_with("Coconut Milk Shampoo"));

    let product = app.backends.products.get(scrub).unwrap();
    assert_eq!(product.image.len(), 2);
    assert!(product.image[0].ends_with("mango-sugar-scrub/front.jpg"));
}

#[tokio::test]
async fn test_update_images_without_matches_omits_errors() {
    let app = TestApp::new();

    let res = app.json(Method::POST, UPDATE_IMAGES, None, None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["updated"], 0);
    assert_eq!(res.body["skipped"], 6);
    assert!(res.body.get("errors").is_none());
    assert_eq!(res.body["message"], "Updated 0 products, skipped 6, 0 errors");
}

// =============================================================================
// upload-product-video
// =============================================================================

const VIDEO_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42 fake video payload";

#[tokio::test]
async fn test_upload_video_stores_file_and_patches_product() {
    let backends = TestBackends::new();
    backends.identity.seed_token("tok-editor", "editor@example.com");
    let product_id = backends.products.seed_named("Mango Sugar Scrub");
    let app = TestApp::with_backends(backends);

    let request = MultipartBody::new()
        .text("productId", &product_id.to_string())
        .file("videoFile", "demo.mp4", "video/mp4", VIDEO_BYTES)
        .into_request(UPLOAD_VIDEO, Some("tok-editor"));
    let res = app.send(request).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["success"], true);
    assert_eq!(res.body["message"], "Video uploaded successfully");
    let video_url = res.body["videoUrl"].as_str().unwrap();
    assert!(video_url.starts_with(&format!(
        "http://remote.test/storage/v1/object/public/product-videos/{product_id}_"
    )));
    assert!(video_url.ends_with(".mp4"));
    assert_eq!(res.body["product"]["has_video"], true);

    let product = app.backends.products.get(product_id).unwrap();
    assert_eq!(product.video_url.as_deref(), Some(video_url));
    assert!(product.has_video);
    assert_eq!(app.backends.storage.object_keys().len(), 1);
}

#[tokio::test]
async fn test_upload_video_with_thumbnail_stores_both() {
    let backends = TestBackends::new();
    backends.identity.seed_token("tok-editor", "editor@example.com");
    let product_id = backends.products.seed_named("Mango Sugar Scrub");
    let app = TestApp::with_backends(backends);

    let request = MultipartBody::new()
        .text("productId", &product_id.to_string())
        .file("videoFile", "demo.mp4", "video/mp4", VIDEO_BYTES)
        .file("thumbnailFile", "poster.png", "image/png", b"\x89PNG fake")
        .into_request(UPLOAD_VIDEO, Some("tok-editor"));
    let res = app.send(request).await;

    assert_eq!(res.status, StatusCode::OK);
    let product = app.backends.products.get(product_id).unwrap();
    assert!(
        product
            .video_thumbnail_url
            .as_deref()
            .unwrap()
            .ends_with("_thumb.png")
    );
    assert_eq!(app.backends.storage.object_keys().len(), 2);
}

#[tokio::test]
async fn test_upload_video_rejects_oversized_video_before_upload() {
    let backends = TestBackends::new();
    backends.identity.seed_token("tok-editor", "editor@example.com");
    let product_id = backends.products.seed_named("Mango Sugar Scrub");
    let app = TestApp::with_backends(backends);

    let oversized = vec![0_u8; MAX_VIDEO_BYTES + 1];
    let request = MultipartBody::new()
        .text("productId", &product_id.to_string())
        .file("videoFile", "demo.mp4", "video/mp4", &oversized)
        .into_request(UPLOAD_VIDEO, Some("tok-editor"));
    let res = app.send(request).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body["error"], "Video file too large. Maximum size is 50MB");
    assert_eq!(app.backends.storage.upload_calls(), 0);
}

#[tokio::test]
async fn test_upload_video_rejects_oversized_thumbnail_before_upload() {
    let backends = TestBackends::new();
    backends.identity.seed_token("tok-editor", "editor@example.com");
    let product_id = backends.products.seed_named("Mango Sugar Scrub");
    let app = TestApp::with_backends(backends);

    let oversized = vec![0_u8; MAX_THUMBNAIL_BYTES + 1];
    let request = MultipartBody::new()
        .text("productId", &product_id.to_string())
        .file("videoFile", "demo.mp4", "video/mp4", VIDEO_BYTES)
        .file("thumbnailFile", "poster.png", "image/png", &oversized)
        .into_request(UPLOAD_VIDEO, Some("tok-editor"));
    let res = app.send(request).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body["success"], false);
    assert!(res.body["error"].as_str().unwrap().contains("too large"));
    assert_eq!(app.backends.storage.upload_calls(), 0);
    assert!(!app.backends.products.get(product_id).unwrap().has_video);
}

#[tokio::test]
async fn test_upload_video_requires_bearer_token() {
    let backends = TestBackends::new();
    let product_id = backends.products.seed_named("Mango Sugar Scrub");
    let app = TestApp::with_backends(backends);

    let request = MultipartBody::new()
        .text("productId", &product_id.to_string())
        .file("videoFile", "demo.mp4", "video/mp4", VIDEO_BYTES)
        .into_request(UPLOAD_VIDEO, None);
    let res = app.send(request).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body["error"], "Unauthorized");
    assert_eq!(app.backends.storage.upload_calls(), 0);
}

#[tokio::test]
async fn test_upload_video_rejects_unknown_token() {
    let backends = TestBackends::new();
    let product_id = backends.products.seed_named("Mango Sugar Scrub");
    let app = TestApp::with_backends(backends);

    let request = MultipartBody::new()
        .text("productId", &product_id.to_string())
        .file("videoFile", "demo.mp4", "video/mp4", VIDEO_BYTES)
        .into_request(UPLOAD_VIDEO, Some("tok-unknown"));
    let res = app.send(request).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_upload_video_requires_video_file() {
    let backends = TestBackends::new();
    backends.identity.seed_token("tok-editor", "editor@example.com");
    let product_id = backends.products.seed_named("Mango Sugar Scrub");
    let app = TestApp::with_backends(backends);

    let request = MultipartBody::new()
        .text("productId", &product_id.to_string())
        .into_request(UPLOAD_VIDEO, Some("tok-editor"));
    let res = app.send(request).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body["error"], "Video file is required");
}

#[tokio::test]
async fn test_upload_video_for_missing_product_cleans_up() {
    let backends = TestBackends::new();
    backends.identity.seed_token("tok-editor", "editor@example.com");
    let app = TestApp::with_backends(backends);

    let request = MultipartBody::new()
        .text("productId", &shopfront_core::ProductId::generate().to_string())
        .file("videoFile", "demo.mp4", "video/mp4", VIDEO_BYTES)
        .into_request(UPLOAD_VIDEO, Some("tok-editor"));
    let res = app.send(request).await;

    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.body["error"], "Product not found");
    assert!(app.backends.storage.object_keys().is_empty());
}
