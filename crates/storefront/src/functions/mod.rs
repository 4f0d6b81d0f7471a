//! The three function endpoints: admin provisioning, batch product-image
//! sync and product video upload.
//!
//! Each workflow lives in its own service type so it can run from an HTTP
//! handler or from the CLI. Failures are [`FunctionError`]s; the HTTP layer
//! pairs one with the endpoint's failure status and renders the
//! `{"success": false, "error": "..."}` envelope.

pub mod add_admin;
pub mod product_images;
pub mod product_video;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{IdentityError, StorageError};

pub use add_admin::{AdminProvisioner, ProvisionedAdmin, ProvisioningRequest};
pub use product_images::{ImageMapping, MappingError, ProductImageSync, SyncReport};
pub use product_video::{
    MAX_THUMBNAIL_BYTES, MAX_VIDEO_BYTES, UploadedFile, VideoUpload, VideoUploadResult,
    VideoUploader,
};

/// Errors returned by the function workflows.
#[derive(Debug, Error)]
pub enum FunctionError {
    /// The provided setup key does not match the configured one.
    #[error("Invalid setup key")]
    InvalidSetupKey,

    /// Missing or invalid bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Input rejected before any side effect.
    #[error("{0}")]
    Validation(String),

    /// The referenced product does not exist.
    #[error("Product not found")]
    ProductNotFound,

    /// The product image mapping could not be loaded.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Identity service call failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Object storage call failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Database operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl FunctionError {
    /// Pair this error with the HTTP status its endpoint reports failures as.
    #[must_use]
    pub const fn with_status(self, status: StatusCode) -> FunctionRejection {
        FunctionRejection {
            status,
            error: self,
        }
    }

    /// Whether the failure came from a dependency rather than the caller.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Identity(_) | Self::Storage(_) | Self::Repository(_) | Self::Mapping(_)
        )
    }
}

/// A [`FunctionError`] rendered as the failure envelope.
#[derive(Debug)]
pub struct FunctionRejection {
    status: StatusCode,
    error: FunctionError,
}

impl FunctionRejection {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub const fn error(&self) -> &FunctionError {
        &self.error
    }
}

impl IntoResponse for FunctionRejection {
    fn into_response(self) -> Response {
        if self.error.is_upstream() {
            let event_id = sentry::capture_error(&self.error);
            tracing::error!(
                error = %self.error,
                sentry_event_id = %event_id,
                "Function error"
            );
        } else {
            tracing::warn!(error = %self.error, "Function request rejected");
        }

        let body = json!({
            "success": false,
            "error": self.error.to_string(),
        });

        (self.status, Json(body)).into_response()
    }
}

/// Report a failed compensating action. The original error still wins.
fn report_compensation_failure(action: &str, error: &dyn std::error::Error) {
    let event_id = sentry::capture_error(error);
    tracing::error!(
        action,
        error = %error,
        sentry_event_id = %event_id,
        "Compensating action failed"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn render(rejection: FunctionRejection) -> (StatusCode, serde_json::Value) {
        let response = rejection.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_envelope_shape() {
        let (status, body) =
            render(FunctionError::InvalidSetupKey.with_status(StatusCode::BAD_REQUEST)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "error": "Invalid setup key"}));
    }

    #[tokio::test]
    async fn test_upstream_message_is_passed_through() {
        let err = FunctionError::Identity(IdentityError::Api {
            status: 422,
            message: "Password should be at least 6 characters".to_owned(),
        });
        assert!(err.is_upstream());
        let (status, body) = render(err.with_status(StatusCode::BAD_REQUEST)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Password should be at least 6 characters");
    }
}
