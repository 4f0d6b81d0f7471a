//! Product video upload.
//!
//! Stores a video (and optional thumbnail) in object storage, then records
//! the public URLs on the product. Uploaded objects are removed again if the
//! product cannot be patched.

use std::path::Path;
use std::sync::Arc;

use axum::extract::Multipart;
use axum::extract::multipart::Field;
use chrono::Utc;
use tracing::instrument;

use shopfront_core::{Product, ProductId};

use super::{FunctionError, report_compensation_failure};
use crate::db::{ProductRepository, VideoAttachment};
use crate::services::ObjectStorage;

/// Largest accepted video, in bytes (50 MiB).
pub const MAX_VIDEO_BYTES: usize = 50 * 1024 * 1024;

/// Largest accepted thumbnail, in bytes (10 MiB).
pub const MAX_THUMBNAIL_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const DEFAULT_VIDEO_EXT: &str = "mp4";
const DEFAULT_THUMBNAIL_EXT: &str = "jpg";

/// A file received in the upload form.
#[derive(Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl UploadedFile {
    fn extension_or(&self, default: &str) -> String {
        self.file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| {
                !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric())
            })
            .map_or_else(|| default.to_owned(), str::to_ascii_lowercase)
    }

    fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

/// A validated upload request.
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub product_id: ProductId,
    pub video: UploadedFile,
    pub thumbnail: Option<UploadedFile>,
}

impl VideoUpload {
    /// Read the multipart form, enforcing size limits while streaming.
    ///
    /// Expects `productId`, `videoFile` and optionally `thumbnailFile`;
    /// other fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FunctionError::Validation`] for a malformed form, a missing
    /// or invalid field, or a file over its size limit.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, FunctionError> {
        let mut product_id = None;
        let mut video = None;
        let mut thumbnail = None;

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("productId") => {
                    let text = field.text().await.map_err(malformed)?;
                    product_id = Some(text.parse::<ProductId>().map_err(|_| {
                        FunctionError::Validation(format!("Invalid productId: {}", text.trim()))
                    })?);
                }
                Some("videoFile") => {
                    video = Some(read_file(field, MAX_VIDEO_BYTES, "Video").await?);
                }
                Some("thumbnailFile") => {
                    thumbnail = Some(read_file(field, MAX_THUMBNAIL_BYTES, "Thumbnail").await?);
                }
                _ => {}
            }
        }

        let product_id = product_id
            .ok_or_else(|| FunctionError::Validation("productId is required".to_owned()))?;
        let video = video
            .filter(|f| !f.bytes.is_empty())
            .ok_or_else(|| FunctionError::Validation("Video file is required".to_owned()))?;

        Ok(Self {
            product_id,
            video,
            thumbnail: thumbnail.filter(|f| !f.bytes.is_empty()),
        })
    }
}

fn malformed(err: axum::extract::multipart::MultipartError) -> FunctionError {
    FunctionError::Validation(format!("Malformed form data: {}", err.body_text()))
}

fn too_large(label: &str, limit: usize) -> FunctionError {
    FunctionError::Validation(format!(
        "{label} file too large. Maximum size is {}MB",
        limit / (1024 * 1024)
    ))
}

async fn read_file(
    mut field: Field<'_>,
    limit: usize,
    label: &str,
) -> Result<UploadedFile, FunctionError> {
    let file_name = field.file_name().map(str::to_owned);
    let content_type = field.content_type().map(str::to_owned);

    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(malformed)? {
        if bytes.len() + chunk.len() > limit {
            return Err(too_large(label, limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(UploadedFile {
        file_name,
        content_type,
        bytes,
    })
}

/// Outcome of a successful upload.
#[derive(Debug, Clone)]
pub struct VideoUploadResult {
    pub product: Product,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
}

/// Uploads product videos and records them on the product.
#[derive(Clone)]
pub struct VideoUploader {
    storage: Arc<dyn ObjectStorage>,
    products: Arc<dyn ProductRepository>,
    bucket: String,
}

impl VideoUploader {
    #[must_use]
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        products: Arc<dyn ProductRepository>,
        bucket: String,
    ) -> Self {
        Self {
            storage,
            products,
            bucket,
        }
    }

    /// Store the files and patch the product.
    ///
    /// # Errors
    ///
    /// Returns [`FunctionError::Validation`] for an empty or oversized file
    /// (before any upload), [`FunctionError::ProductNotFound`] if no product
    /// has the id, or the underlying storage/database error. Objects uploaded
    /// by this call are removed before a post-upload error is returned.
    #[instrument(skip(self, upload), fields(product_id = %upload.product_id))]
    pub async fn upload(&self, upload: VideoUpload) -> Result<VideoUploadResult, FunctionError> {
        if upload.video.bytes.is_empty() {
            return Err(FunctionError::Validation("Video file is required".to_owned()));
        }
        if upload.video.bytes.len() > MAX_VIDEO_BYTES {
            return Err(too_large("Video", MAX_VIDEO_BYTES));
        }
        if let Some(thumb) = &upload.thumbnail
            && thumb.bytes.len() > MAX_THUMBNAIL_BYTES
        {
            return Err(too_large("Thumbnail", MAX_THUMBNAIL_BYTES));
        }

        let stamp = Utc::now().timestamp_millis();
        let video_path = format!(
            "{}_{stamp}.{}",
            upload.product_id,
            upload.video.extension_or(DEFAULT_VIDEO_EXT)
        );

        let video_type = upload.video.content_type().to_owned();
        self.storage
            .upload(&self.bucket, &video_path, &video_type, upload.video.bytes)
            .await?;
        let mut uploaded = vec![video_path.clone()];

        let mut thumbnail_url = None;
        if let Some(thumb) = upload.thumbnail {
            let thumb_path = format!(
                "{}_{stamp}_thumb.{}",
                upload.product_id,
                thumb.extension_or(DEFAULT_THUMBNAIL_EXT)
            );
            let thumb_type = thumb.content_type().to_owned();
            if let Err(e) = self
                .storage
                .upload(&self.bucket, &thumb_path, &thumb_type, thumb.bytes)
                .await
            {
                self.remove_uploaded(&uploaded).await;
                return Err(e.into());
            }
            thumbnail_url = Some(self.storage.public_url(&self.bucket, &thumb_path));
            uploaded.push(thumb_path);
        }

        let attachment = VideoAttachment {
            video_url: self.storage.public_url(&self.bucket, &video_path),
            thumbnail_url,
        };

        let patched = self
            .products
            .attach_video(upload.product_id, &attachment, Utc::now())
            .await;

        match patched {
            Ok(Some(product)) => {
                tracing::info!(objects = uploaded.len(), "Product video attached");
                Ok(VideoUploadResult {
                    product,
                    video_url: attachment.video_url,
                    thumbnail_url: attachment.thumbnail_url,
                })
            }
            Ok(None) => {
                self.remove_uploaded(&uploaded).await;
                Err(FunctionError::ProductNotFound)
            }
            Err(e) => {
                self.remove_uploaded(&uploaded).await;
                Err(e.into())
            }
        }
    }

    async fn remove_uploaded(&self, paths: &[String]) {
        match self.storage.remove(&self.bucket, paths).await {
            Ok(()) => tracing::warn!(?paths, "Removed uploaded objects after failure"),
            Err(e) => report_compensation_failure("remove uploaded objects", &e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_VIDEO_BUCKET;
    use crate::testing::{FakeStorage, MemoryProducts};

    fn file(name: &str, len: usize) -> UploadedFile {
        UploadedFile {
            file_name: Some(name.to_owned()),
            content_type: Some("video/mp4".to_owned()),
            bytes: vec![0; len],
        }
    }

    struct Harness {
        storage: Arc<FakeStorage>,
        products: Arc<MemoryProducts>,
        uploader: VideoUploader,
    }

    fn harness() -> Harness {
        let storage = Arc::new(FakeStorage::default());
        let products = Arc::new(MemoryProducts::default());
        let uploader = VideoUploader::new(
            storage.clone(),
            products.clone(),
            DEFAULT_VIDEO_BUCKET.to_owned(),
        );
        Harness {
            storage,
            products,
            uploader,
        }
    }

    #[test]
    fn test_extension_defaults() {
        assert_eq!(file("clip.MOV", 1).extension_or("mp4"), "mov");
        assert_eq!(file("clip", 1).extension_or("mp4"), "mp4");
        assert_eq!(file("clip.m p4", 1).extension_or("mp4"), "mp4");
        let unnamed = UploadedFile {
            file_name: None,
            content_type: None,
            bytes: Vec::new(),
        };
        assert_eq!(unnamed.extension_or("jpg"), "jpg");
        assert_eq!(unnamed.content_type(), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_upload_attaches_video_and_thumbnail() {
        let h = harness();
        let id = h.products.seed_named("Mango Sugar Scrub");

        let result = h
            .uploader
            .upload(VideoUpload {
                product_id: id,
                video: file("demo.webm", 1024),
                thumbnail: Some(file("poster.png", 16)),
            })
            .await
            .unwrap();

        assert!(result.product.has_video);
        assert_eq!(result.product.video_url.as_deref(), Some(result.video_url.as_str()));
        assert!(result.video_url.ends_with(".webm"));
        assert!(result.thumbnail_url.unwrap().ends_with("_thumb.png"));

        let keys = h.storage.object_keys();
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|k| k.starts_with(&format!("product-videos/{id}_"))));
    }

    #[tokio::test]
    async fn test_oversized_video_never_uploads() {
        let h = harness();
        let id = h.products.seed_named("Big");

        let err = h
            .uploader
            .upload(VideoUpload {
                product_id: id,
                video: file("huge.mp4", MAX_VIDEO_BYTES + 1),
                thumbnail: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, FunctionError::Validation(_)));
        assert_eq!(h.storage.upload_calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_removes_uploads() {
        let h = harness();

        let err = h
            .uploader
            .upload(VideoUpload {
                product_id: ProductId::generate(),
                video: file("demo.mp4", 10),
                thumbnail: Some(file("poster.jpg", 10)),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, FunctionError::ProductNotFound));
        assert_eq!(h.storage.upload_calls(), 2);
        assert!(h.storage.object_keys().is_empty());
    }

    #[tokio::test]
    async fn test_failed_patch_removes_uploads() {
        let h = harness();
        let id = h.products.seed_named("Flaky");
        h.products.fail_video_patches();

        let err = h
            .uploader
            .upload(VideoUpload {
                product_id: id,
                video: file("demo.mp4", 10),
                thumbnail: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, FunctionError::Repository(_)));
        assert!(h.storage.object_keys().is_empty());
        assert!(!h.products.get(id).unwrap().has_video);
    }
}
