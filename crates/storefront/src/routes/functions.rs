//! Function endpoint handlers.
//!
//! Responses use the `{"success": true, ...}` envelope. Failure statuses are
//! fixed per endpoint: 400 for `add-admin`, 500 for the other two.

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::{HeaderMap, StatusCode},
};
use serde::Serialize;
use tracing::instrument;

use shopfront_core::{AdminRole, Email, IdentityUserId, ProductId};

use crate::functions::product_images::load_mapping;
use crate::functions::{FunctionError, FunctionRejection, ProvisioningRequest, VideoUpload};
use crate::middleware::bearer_token;
use crate::state::AppState;

type FunctionResult<T> = std::result::Result<Json<T>, FunctionRejection>;

#[derive(Debug, Serialize)]
pub struct AddAdminResponse {
    pub success: bool,
    pub message: &'static str,
    pub admin: AdminSummary,
}

#[derive(Debug, Serialize)]
pub struct AdminSummary {
    /// Identity-service user id.
    pub id: IdentityUserId,
    pub email: Email,
    pub role: AdminRole,
}

#[derive(Debug, Serialize)]
pub struct UpdateImagesResponse {
    pub success: bool,
    pub updated: usize,
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadVideoResponse {
    pub success: bool,
    pub message: &'static str,
    pub video_url: String,
    pub product: ProductSummary,
}

#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub has_video: bool,
}

/// `POST /functions/v1/add-admin`
#[instrument(skip_all)]
pub async fn add_admin(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProvisioningRequest>, JsonRejection>,
) -> FunctionResult<AddAdminResponse> {
    let fail = |e: FunctionError| e.with_status(StatusCode::BAD_REQUEST);

    let Json(request) = payload.map_err(|e| fail(FunctionError::Validation(e.body_text())))?;

    let provisioned = state
        .provisioner()
        .provision_with_setup_key(request, &state.config().admin_setup_key)
        .await
        .map_err(fail)?;

    Ok(Json(AddAdminResponse {
        success: true,
        message: provisioned.message(),
        admin: AdminSummary {
            id: provisioned.admin.user_id,
            email: provisioned.email,
            role: provisioned.admin.role,
        },
    }))
}

/// `POST /functions/v1/update-product-images`
#[instrument(skip_all)]
pub async fn update_product_images(
    State(state): State<AppState>,
) -> FunctionResult<UpdateImagesResponse> {
    let mapping = load_mapping(state.config().product_image_map_path.as_deref())
        .await
        .map_err(|e| FunctionError::from(e).with_status(StatusCode::INTERNAL_SERVER_ERROR))?;

    let report = state.image_sync().run(&mapping).await;

    Ok(Json(UpdateImagesResponse {
        success: true,
        updated: report.updated,
        skipped: report.skipped,
        message: report.message(),
        errors: (!report.errors.is_empty()).then_some(report.errors),
    }))
}

/// `POST /functions/v1/upload-product-video`
#[instrument(skip_all, fields(user_id))]
pub async fn upload_product_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> FunctionResult<UploadVideoResponse> {
    let fail = |e: FunctionError| e.with_status(StatusCode::INTERNAL_SERVER_ERROR);

    let token = bearer_token(&headers).ok_or_else(|| fail(FunctionError::Unauthorized))?;
    let user = state
        .identity()
        .user_for_token(token)
        .await
        .map_err(|e| fail(e.into()))?
        .ok_or_else(|| fail(FunctionError::Unauthorized))?;
    tracing::Span::current().record("user_id", tracing::field::display(user.id));

    let multipart = multipart.map_err(|e| fail(FunctionError::Validation(e.body_text())))?;
    let upload = VideoUpload::from_multipart(multipart).await.map_err(fail)?;
    let result = state.uploader().upload(upload).await.map_err(fail)?;

    Ok(Json(UploadVideoResponse {
        success: true,
        message: "Video uploaded successfully",
        video_url: result.video_url,
        product: ProductSummary {
            id: result.product.id,
            name: result.product.name,
            has_video: result.product.has_video,
        },
    }))
}
