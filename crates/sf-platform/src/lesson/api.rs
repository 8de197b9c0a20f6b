//! Lessons API
//!
//! REST endpoints for lesson management, nested under a chapter.

use axum::{
    extract::{State, Path},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::lesson::entity::Lesson;
use crate::media::entity::MediaStatus;
use crate::{
    AuditService, Chapter, ChapterRepository, CourseRepository, LessonRepository,
    MediaAssetRepository,
};
use crate::shared::api_common::{CreatedResponse, SuccessResponse};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;

/// Lesson response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonResponse {
    pub id: String,
    pub chapter_id: String,
    pub course_id: String,
    pub title: String,
    pub description: Option<String>,
    pub position: u32,
    pub video_asset_id: Option<String>,
    pub duration_seconds: u32,
    pub status: String,
}

impl From<Lesson> for LessonResponse {
    fn from(l: Lesson) -> Self {
        Self {
            id: l.id,
            chapter_id: l.chapter_id,
            course_id: l.course_id,
            title: l.title,
            description: l.description,
            position: l.position,
            video_asset_id: l.video_asset_id,
            duration_seconds: l.duration_seconds,
            status: format!("{:?}", l.status).to_uppercase(),
        }
    }
}

/// Lesson list response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LessonListResponse {
    pub lessons: Vec<LessonResponse>,
}

/// Create lesson request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLessonRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Update lesson request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Attach video request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachVideoRequest {
    pub asset_id: String,
    /// Playback duration in seconds as reported by the uploader
    pub duration_seconds: u32,
}

/// Reorder request: complete list of lesson IDs in the new order
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderLessonsRequest {
    pub lesson_ids: Vec<String>,
}

/// Lessons service state
#[derive(Clone)]
pub struct LessonsState {
    pub lesson_repo: Arc<LessonRepository>,
    pub chapter_repo: Arc<ChapterRepository>,
    pub course_repo: Arc<CourseRepository>,
    pub media_repo: Arc<MediaAssetRepository>,
    pub audit_service: Arc<AuditService>,
}

/// Resolve the chapter and verify course ownership
async fn owned_chapter(
    state: &LessonsState,
    chapter_id: &str,
    auth: &crate::AuthContext,
) -> Result<Chapter, PlatformError> {
    let chapter = state.chapter_repo.find_by_id(chapter_id).await?
        .ok_or_else(|| PlatformError::not_found("Chapter", chapter_id))?;

    let course = state.course_repo.find_by_id(&chapter.course_id).await?
        .ok_or_else(|| PlatformError::CourseNotFound { id: chapter.course_id.clone() })?;

    if course.instructor_id != auth.principal_id && !auth.is_admin() {
        return Err(PlatformError::forbidden("Not the owner of this course"));
    }

    Ok(chapter)
}

/// Create a lesson at the end of the chapter
#[utoipa::path(
    post,
    path = "",
    tag = "lessons",
    operation_id = "postApiChaptersByChapterIdLessons",
    params(
        ("chapter_id" = String, Path, description = "Chapter ID")
    ),
    request_body = CreateLessonRequest,
    responses(
        (status = 201, description = "Lesson created", body = CreatedResponse),
        (status = 404, description = "Chapter not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_lesson(
    State(state): State<LessonsState>,
    auth: Authenticated,
    Path(chapter_id): Path<String>,
    Json(req): Json<CreateLessonRequest>,
) -> Result<Json<CreatedResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_update_courses(&auth.0)?;
    let chapter = owned_chapter(&state, &chapter_id, &auth.0).await?;

    let title = req.title.trim();
    if title.is_empty() {
        return Err(PlatformError::validation("Lesson title is required"));
    }

    let position = state.lesson_repo.count_by_chapter(&chapter_id).await? as u32;
    let mut lesson = Lesson::new(&chapter_id, &chapter.course_id, title, position);
    lesson.description = req.description;

    let id = lesson.id.clone();
    state.lesson_repo.insert(&lesson).await?;
    state.audit_service.log_create(&auth.0, "Lesson", &id, "CreateLessonCommand").await?;

    Ok(Json(CreatedResponse::new(id)))
}

/// List lessons of a chapter in position order
#[utoipa::path(
    get,
    path = "",
    tag = "lessons",
    operation_id = "getApiChaptersByChapterIdLessons",
    params(
        ("chapter_id" = String, Path, description = "Chapter ID")
    ),
    responses(
        (status = 200, description = "List of lessons", body = LessonListResponse),
        (status = 404, description = "Chapter not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_lessons(
    State(state): State<LessonsState>,
    auth: Authenticated,
    Path(chapter_id): Path<String>,
) -> Result<Json<LessonListResponse>, PlatformError> {
    owned_chapter(&state, &chapter_id, &auth.0).await?;

    let lessons = state.lesson_repo.find_by_chapter(&chapter_id).await?;
    Ok(Json(LessonListResponse {
        lessons: lessons.into_iter().map(|l| l.into()).collect(),
    }))
}

/// Update a lesson
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "lessons",
    operation_id = "putApiChaptersByChapterIdLessonsById",
    params(
        ("chapter_id" = String, Path, description = "Chapter ID"),
        ("id" = String, Path, description = "Lesson ID")
    ),
    request_body = UpdateLessonRequest,
    responses(
        (status = 200, description = "Lesson updated", body = LessonResponse),
        (status = 404, description = "Lesson not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_lesson(
    State(state): State<LessonsState>,
    auth: Authenticated,
    Path((chapter_id, id)): Path<(String, String)>,
    Json(req): Json<UpdateLessonRequest>,
) -> Result<Json<LessonResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_update_courses(&auth.0)?;
    owned_chapter(&state, &chapter_id, &auth.0).await?;

    let mut lesson = state.lesson_repo.find_by_id(&id).await?
        .filter(|l| l.chapter_id == chapter_id)
        .ok_or_else(|| PlatformError::not_found("Lesson", &id))?;

    if let Some(title) = req.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(PlatformError::validation("Lesson title must not be empty"));
        }
        lesson.title = title;
    }
    if let Some(desc) = req.description {
        lesson.description = Some(desc);
    }
    lesson.updated_at = chrono::Utc::now();

    state.lesson_repo.update(&lesson).await?;
    state.audit_service.log_update(&auth.0, "Lesson", &id, "UpdateLessonCommand").await?;

    Ok(Json(lesson.into()))
}

/// Attach a ready video asset to a lesson
#[utoipa::path(
    post,
    path = "/{id}/video",
    tag = "lessons",
    operation_id = "postApiChaptersByChapterIdLessonsByIdVideo",
    params(
        ("chapter_id" = String, Path, description = "Chapter ID"),
        ("id" = String, Path, description = "Lesson ID")
    ),
    request_body = AttachVideoRequest,
    responses(
        (status = 200, description = "Video attached", body = LessonResponse),
        (status = 404, description = "Lesson or asset not found"),
        (status = 409, description = "Asset not ready")
    ),
    security(("bearer_auth" = []))
)]
pub async fn attach_video(
    State(state): State<LessonsState>,
    auth: Authenticated,
    Path((chapter_id, id)): Path<(String, String)>,
    Json(req): Json<AttachVideoRequest>,
) -> Result<Json<LessonResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_update_courses(&auth.0)?;
    owned_chapter(&state, &chapter_id, &auth.0).await?;

    let mut lesson = state.lesson_repo.find_by_id(&id).await?
        .filter(|l| l.chapter_id == chapter_id)
        .ok_or_else(|| PlatformError::not_found("Lesson", &id))?;

    let asset = state.media_repo.find_by_id(&req.asset_id).await?
        .ok_or_else(|| PlatformError::not_found("MediaAsset", &req.asset_id))?;

    if asset.owner_id != auth.0.principal_id && !auth.0.is_admin() {
        return Err(PlatformError::forbidden("Not the owner of this asset"));
    }
    if asset.status != MediaStatus::Ready {
        return Err(PlatformError::validation("Only ready assets can be attached"));
    }
    if !asset.is_video() {
        return Err(PlatformError::validation("Only video assets can be attached to lessons"));
    }

    lesson.attach_video(&req.asset_id, req.duration_seconds);
    state.lesson_repo.update(&lesson).await?;
    state.audit_service.log_update(&auth.0, "Lesson", &id, "AttachVideoCommand").await?;

    Ok(Json(lesson.into()))
}

/// Detach the video asset from a lesson (unpublishes the lesson)
#[utoipa::path(
    delete,
    path = "/{id}/video",
    tag = "lessons",
    operation_id = "deleteApiChaptersByChapterIdLessonsByIdVideo",
    params(
        ("chapter_id" = String, Path, description = "Chapter ID"),
        ("id" = String, Path, description = "Lesson ID")
    ),
    responses(
        (status = 200, description = "Video detached", body = LessonResponse),
        (status = 404, description = "Lesson not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn detach_video(
    State(state): State<LessonsState>,
    auth: Authenticated,
    Path((chapter_id, id)): Path<(String, String)>,
) -> Result<Json<LessonResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_update_courses(&auth.0)?;
    owned_chapter(&state, &chapter_id, &auth.0).await?;

    let mut lesson = state.lesson_repo.find_by_id(&id).await?
        .filter(|l| l.chapter_id == chapter_id)
        .ok_or_else(|| PlatformError::not_found("Lesson", &id))?;

    lesson.detach_video();
    state.lesson_repo.update(&lesson).await?;
    state.audit_service.log_update(&auth.0, "Lesson", &id, "DetachVideoCommand").await?;

    Ok(Json(lesson.into()))
}

/// Publish a lesson
#[utoipa::path(
    post,
    path = "/{id}/publish",
    tag = "lessons",
    operation_id = "postApiChaptersByChapterIdLessonsByIdPublish",
    params(
        ("chapter_id" = String, Path, description = "Chapter ID"),
        ("id" = String, Path, description = "Lesson ID")
    ),
    responses(
        (status = 200, description = "Lesson published", body = LessonResponse),
        (status = 404, description = "Lesson not found"),
        (status = 409, description = "Lesson has no ready video")
    ),
    security(("bearer_auth" = []))
)]
pub async fn publish_lesson(
    State(state): State<LessonsState>,
    auth: Authenticated,
    Path((chapter_id, id)): Path<(String, String)>,
) -> Result<Json<LessonResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_update_courses(&auth.0)?;
    owned_chapter(&state, &chapter_id, &auth.0).await?;

    let mut lesson = state.lesson_repo.find_by_id(&id).await?
        .filter(|l| l.chapter_id == chapter_id)
        .ok_or_else(|| PlatformError::not_found("Lesson", &id))?;

    let Some(ref asset_id) = lesson.video_asset_id else {
        return Err(PlatformError::validation("Attach a video before publishing"));
    };

    let asset = state.media_repo.find_by_id(asset_id).await?
        .ok_or_else(|| PlatformError::not_found("MediaAsset", asset_id))?;
    if asset.status != MediaStatus::Ready {
        return Err(PlatformError::validation("The attached video is not ready"));
    }

    lesson.publish();
    state.lesson_repo.update(&lesson).await?;
    state.audit_service.log_update(&auth.0, "Lesson", &id, "PublishLessonCommand").await?;

    Ok(Json(lesson.into()))
}

/// Unpublish a lesson
#[utoipa::path(
    post,
    path = "/{id}/unpublish",
    tag = "lessons",
    operation_id = "postApiChaptersByChapterIdLessonsByIdUnpublish",
    params(
        ("chapter_id" = String, Path, description = "Chapter ID"),
        ("id" = String, Path, description = "Lesson ID")
    ),
    responses(
        (status = 200, description = "Lesson unpublished", body = LessonResponse),
        (status = 404, description = "Lesson not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unpublish_lesson(
    State(state): State<LessonsState>,
    auth: Authenticated,
    Path((chapter_id, id)): Path<(String, String)>,
) -> Result<Json<LessonResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_update_courses(&auth.0)?;
    owned_chapter(&state, &chapter_id, &auth.0).await?;

    let mut lesson = state.lesson_repo.find_by_id(&id).await?
        .filter(|l| l.chapter_id == chapter_id)
        .ok_or_else(|| PlatformError::not_found("Lesson", &id))?;

    lesson.unpublish();
    state.lesson_repo.update(&lesson).await?;
    state.audit_service.log_update(&auth.0, "Lesson", &id, "UnpublishLessonCommand").await?;

    Ok(Json(lesson.into()))
}

/// Reorder lessons within a chapter
#[utoipa::path(
    post,
    path = "/reorder",
    tag = "lessons",
    operation_id = "postApiChaptersByChapterIdLessonsReorder",
    params(
        ("chapter_id" = String, Path, description = "Chapter ID")
    ),
    request_body = ReorderLessonsRequest,
    responses(
        (status = 200, description = "Lessons reordered", body = SuccessResponse),
        (status = 400, description = "ID list does not match chapter lessons")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reorder_lessons(
    State(state): State<LessonsState>,
    auth: Authenticated,
    Path(chapter_id): Path<String>,
    Json(req): Json<ReorderLessonsRequest>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_update_courses(&auth.0)?;
    owned_chapter(&state, &chapter_id, &auth.0).await?;

    let existing = state.lesson_repo.find_by_chapter(&chapter_id).await?;
    let existing_ids: std::collections::HashSet<&str> =
        existing.iter().map(|l| l.id.as_str()).collect();

    if req.lesson_ids.len() != existing.len()
        || !req.lesson_ids.iter().all(|id| existing_ids.contains(id.as_str()))
    {
        return Err(PlatformError::validation(
            "Reorder must list every lesson of the chapter exactly once",
        ));
    }

    for (position, id) in req.lesson_ids.iter().enumerate() {
        state.lesson_repo.set_position(id, position as u32).await?;
    }

    state.audit_service.log_update(&auth.0, "Chapter", &chapter_id, "ReorderLessonsCommand").await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Delete a lesson
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "lessons",
    operation_id = "deleteApiChaptersByChapterIdLessonsById",
    params(
        ("chapter_id" = String, Path, description = "Chapter ID"),
        ("id" = String, Path, description = "Lesson ID")
    ),
    responses(
        (status = 200, description = "Lesson deleted", body = SuccessResponse),
        (status = 404, description = "Lesson not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_lesson(
    State(state): State<LessonsState>,
    auth: Authenticated,
    Path((chapter_id, id)): Path<(String, String)>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_update_courses(&auth.0)?;
    owned_chapter(&state, &chapter_id, &auth.0).await?;

    let found = state.lesson_repo.find_by_id(&id).await?
        .filter(|l| l.chapter_id == chapter_id)
        .is_some();
    if !found {
        return Err(PlatformError::not_found("Lesson", &id));
    }

    state.lesson_repo.delete(&id).await?;

    // Close the position gap
    let remaining = state.lesson_repo.find_by_chapter(&chapter_id).await?;
    for (position, l) in remaining.iter().enumerate() {
        if l.position != position as u32 {
            state.lesson_repo.set_position(&l.id, position as u32).await?;
        }
    }

    state.audit_service.log_delete(&auth.0, "Lesson", &id, "DeleteLessonCommand").await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Create lessons router (nested under /api/chapters/{chapter_id}/lessons)
pub fn lessons_router(state: LessonsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_lesson, list_lessons))
        .routes(routes!(update_lesson, delete_lesson))
        .routes(routes!(attach_video, detach_video))
        .routes(routes!(publish_lesson))
        .routes(routes!(unpublish_lesson))
        .routes(routes!(reorder_lessons))
        .with_state(state)
}
