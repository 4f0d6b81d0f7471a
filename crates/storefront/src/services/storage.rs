//! Object storage client.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use super::{build_http_client, endpoint, error_message, service_headers};
use crate::config::RemoteConfig;

/// Errors that can occur when interacting with object storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service returned an error response.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Failed to build a request or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Bucket-addressed object storage.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` at `bucket/path`. Existing objects are not overwritten.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), StorageError>;

    /// Public URL of an object. Does not check that the object exists.
    fn public_url(&self, bucket: &str, path: &str) -> String;

    /// Remove objects from a bucket.
    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), StorageError>;
}

#[derive(Debug, Serialize)]
struct RemoveRequest<'a> {
    prefixes: &'a [String],
}

/// REST client for object storage.
#[derive(Clone)]
pub struct StorageClient {
    client: reqwest::Client,
    config: RemoteConfig,
}

impl StorageClient {
    /// Create a new storage client.
    ///
    /// # Errors
    ///
    /// Returns error if the service key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &RemoteConfig) -> Result<Self, StorageError> {
        let headers = service_headers(config)
            .map_err(|e| StorageError::Parse(format!("Invalid service key format: {e}")))?;

        Ok(Self {
            client: build_http_client(headers)?,
            config: config.clone(),
        })
    }

    fn object_path(bucket: &str, path: &str) -> String {
        let encoded: Vec<_> = path.split('/').map(urlencoding::encode).collect();
        format!("{}/{}", urlencoding::encode(bucket), encoded.join("/"))
    }
}

#[async_trait]
impl ObjectStorage for StorageClient {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), StorageError> {
        let url = endpoint(
            &self.config,
            &format!("storage/v1/object/{}", Self::object_path(bucket, path)),
        );

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        check_status(response).await
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        endpoint(
            &self.config,
            &format!(
                "storage/v1/object/public/{}",
                Self::object_path(bucket, path)
            ),
        )
    }

    #[instrument(skip(self))]
    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), StorageError> {
        let url = endpoint(
            &self.config,
            &format!("storage/v1/object/{}", urlencoding::encode(bucket)),
        );

        let response = self
            .client
            .delete(&url)
            .json(&RemoveRequest { prefixes: paths })
            .send()
            .await?;

        check_status(response).await
    }
}

async fn check_status(response: reqwest::Response) -> Result<(), StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Api {
        status: status.as_u16(),
        message: error_message(&body),
    })
}
