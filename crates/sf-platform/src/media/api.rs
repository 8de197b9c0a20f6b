//! Media Library API
//!
//! Request an upload slot, finalize the upload, list and delete assets.

use axum::{
    extract::{State, Path, Query},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::{ToSchema, IntoParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::media::entity::{MediaAsset, MediaKind, MediaStatus};
use crate::media::storage::StorageService;
use crate::{AuditService, LessonRepository, MediaAssetRepository};
use crate::shared::api_common::{PaginationParams, SuccessResponse};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;

/// Media asset response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaAssetResponse {
    pub id: String,
    pub owner_id: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: Option<u64>,
    pub kind: String,
    pub storage_key: String,
    pub status: String,
    pub created_at: String,
}

impl From<MediaAsset> for MediaAssetResponse {
    fn from(a: MediaAsset) -> Self {
        Self {
            id: a.id,
            owner_id: a.owner_id,
            file_name: a.file_name,
            content_type: a.content_type,
            size_bytes: a.size_bytes,
            kind: format!("{:?}", a.kind).to_uppercase(),
            storage_key: a.storage_key,
            status: format!("{:?}", a.status).to_uppercase(),
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

/// Media asset list response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MediaAssetListResponse {
    pub assets: Vec<MediaAssetResponse>,
    pub total: u64,
}

/// Request an upload slot
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestUploadRequest {
    pub file_name: String,
    pub content_type: String,
    /// VIDEO, IMAGE, or ATTACHMENT
    pub kind: String,
}

/// Upload slot response: PUT the URL, then finalize
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadSlotResponse {
    pub asset_id: String,
    pub upload_url: String,
    pub storage_key: String,
    pub expires_in_secs: u64,
    pub max_upload_bytes: u64,
}

/// Query for asset listing
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MediaQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Filter by kind: VIDEO, IMAGE, ATTACHMENT
    pub kind: Option<String>,
}

/// Media service state
#[derive(Clone)]
pub struct MediaState {
    pub media_repo: Arc<MediaAssetRepository>,
    pub lesson_repo: Arc<LessonRepository>,
    pub storage: Arc<StorageService>,
    pub audit_service: Arc<AuditService>,
}

fn parse_kind(s: &str) -> Result<MediaKind, PlatformError> {
    match s.to_uppercase().as_str() {
        "VIDEO" => Ok(MediaKind::Video),
        "IMAGE" => Ok(MediaKind::Image),
        "ATTACHMENT" => Ok(MediaKind::Attachment),
        _ => Err(PlatformError::validation(format!(
            "Invalid kind: {}. Valid options: VIDEO, IMAGE, ATTACHMENT", s
        ))),
    }
}

/// Request a pre-signed upload slot
#[utoipa::path(
    post,
    path = "/uploads",
    tag = "media",
    operation_id = "postApiMediaUploads",
    request_body = RequestUploadRequest,
    responses(
        (status = 201, description = "Upload slot created", body = UploadSlotResponse),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn request_upload(
    State(state): State<MediaState>,
    auth: Authenticated,
    Json(req): Json<RequestUploadRequest>,
) -> Result<Json<UploadSlotResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_upload_media(&auth.0)?;

    let kind = parse_kind(&req.kind)?;
    if !kind.accepts_content_type(&req.content_type) {
        return Err(PlatformError::validation(format!(
            "Content type {} does not match kind {}", req.content_type, req.kind
        )));
    }

    let asset = MediaAsset::new(&auth.0.principal_id, &req.file_name, &req.content_type, kind);
    let slot = state.storage.presign_upload(&asset.storage_key, &asset.content_type).await?;

    state.media_repo.insert(&asset).await?;
    state.audit_service.log_create(&auth.0, "MediaAsset", &asset.id, "RequestUploadCommand").await?;

    Ok(Json(UploadSlotResponse {
        asset_id: asset.id,
        upload_url: slot.upload_url,
        storage_key: slot.storage_key,
        expires_in_secs: slot.expires_in_secs,
        max_upload_bytes: state.storage.max_upload_bytes(),
    }))
}

/// Finalize an upload after the PUT completed
#[utoipa::path(
    post,
    path = "/{id}/finalize",
    tag = "media",
    operation_id = "postApiMediaByIdFinalize",
    params(
        ("id" = String, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Asset ready", body = MediaAssetResponse),
        (status = 404, description = "Asset not found"),
        (status = 409, description = "Upload missing or oversized")
    ),
    security(("bearer_auth" = []))
)]
pub async fn finalize_upload(
    State(state): State<MediaState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<MediaAssetResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_upload_media(&auth.0)?;

    let mut asset = state.media_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::not_found("MediaAsset", &id))?;

    if asset.owner_id != auth.0.principal_id && !auth.0.is_admin() {
        return Err(PlatformError::forbidden("Not the owner of this asset"));
    }
    if asset.status == MediaStatus::Ready {
        return Ok(Json(asset.into()));
    }

    let size = state.storage.object_size(&asset.storage_key).await?;
    if size == 0 {
        return Err(PlatformError::validation("Uploaded object is empty"));
    }
    if size > state.storage.max_upload_bytes() {
        asset.fail();
        state.media_repo.update(&asset).await?;
        state.storage.delete_object(&asset.storage_key).await;
        return Err(PlatformError::validation("Uploaded object exceeds the size limit"));
    }

    asset.finalize(size);
    state.media_repo.update(&asset).await?;
    state.audit_service.log_update(&auth.0, "MediaAsset", &id, "FinalizeUploadCommand").await?;

    Ok(Json(asset.into()))
}

/// List the caller's assets
#[utoipa::path(
    get,
    path = "",
    tag = "media",
    operation_id = "getApiMedia",
    params(MediaQuery),
    responses(
        (status = 200, description = "List of assets", body = MediaAssetListResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_assets(
    State(state): State<MediaState>,
    auth: Authenticated,
    Query(query): Query<MediaQuery>,
) -> Result<Json<MediaAssetListResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_read_media(&auth.0)?;

    let kind = match query.kind.as_deref() {
        Some(s) => Some(parse_kind(s)?),
        None => None,
    };

    let assets = state.media_repo.find_by_owner(
        &auth.0.principal_id,
        kind,
        query.pagination.offset(),
        query.pagination.limit(),
    ).await?;
    let total = state.media_repo.count_by_owner(&auth.0.principal_id, kind).await?;

    Ok(Json(MediaAssetListResponse {
        assets: assets.into_iter().map(|a| a.into()).collect(),
        total,
    }))
}

/// Delete an asset
///
/// Assets referenced by a lesson cannot be deleted. The storage object is
/// removed best-effort before the metadata record.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "media",
    operation_id = "deleteApiMediaById",
    params(
        ("id" = String, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Asset deleted", body = SuccessResponse),
        (status = 404, description = "Asset not found"),
        (status = 409, description = "Asset in use by a lesson")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_asset(
    State(state): State<MediaState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_delete_media(&auth.0)?;

    let asset = state.media_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::not_found("MediaAsset", &id))?;

    if asset.owner_id != auth.0.principal_id && !auth.0.is_admin() {
        return Err(PlatformError::forbidden("Not the owner of this asset"));
    }

    if let Some(lesson) = state.lesson_repo.find_by_video_asset(&id).await? {
        return Err(PlatformError::duplicate("MediaAsset", "lesson", lesson.id));
    }

    state.storage.delete_object(&asset.storage_key).await;
    state.media_repo.delete(&id).await?;
    state.audit_service.log_delete(&auth.0, "MediaAsset", &id, "DeleteAssetCommand").await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Create media router
pub fn media_router(state: MediaState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(request_upload))
        .routes(routes!(finalize_upload))
        .routes(routes!(list_assets))
        .routes(routes!(delete_asset))
        .with_state(state)
}
