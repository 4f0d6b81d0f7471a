//! Integration tests for Shopfront.
//!
//! Every test drives the full router (middleware included) against the
//! in-memory backends from `shopfront_storefront::testing`, so no database or
//! remote service is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `functions` - add-admin, update-product-images, upload-product-video
//! - `content_api` - Public read model, health and CORS
//! - `admin_api` - Admin CRUD authorization and behavior

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use shopfront_storefront::testing::{TestBackends, test_config};
use shopfront_storefront::{AppState, app};

pub use shopfront_storefront::testing::TEST_SETUP_KEY;

/// Largest response body the helpers will buffer.
const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// A router wired to fresh in-memory backends.
pub struct TestApp {
    pub backends: TestBackends,
    router: Router,
}

/// A buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    /// Build an app with empty backends.
    #[must_use]
    pub fn new() -> Self {
        Self::with_backends(TestBackends::new())
    }

    /// Build an app over pre-seeded backends.
    #[must_use]
    pub fn with_backends(backends: TestBackends) -> Self {
        let state = AppState::new(test_config(), None, backends.backends());
        Self {
            router: app(state),
            backends,
        }
    }

    /// Send a request and buffer the response. Empty bodies become `Null`,
    /// non-JSON bodies a JSON string.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), MAX_RESPONSE_BYTES)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    /// Send a request with an optional bearer token and JSON body.
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Hand-built `multipart/form-data` body.
pub struct MultipartBody {
    boundary: &'static str,
    bytes: Vec<u8>,
}

impl MultipartBody {
    #[must_use]
    pub fn new() -> Self {
        Self {
            boundary: "shopfront-test-boundary",
            bytes: Vec::new(),
        }
    }

    /// Append a text field.
    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    /// Append a file field.
    #[must_use]
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    /// Close the body and build a POST request to `uri`.
    #[must_use]
    pub fn into_request(mut self, uri: &str, token: Option<&str>) -> Request<Body> {
        self.bytes
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        let mut builder = Request::post(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", self.boundary),
        );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(self.bytes)).unwrap()
    }
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}
