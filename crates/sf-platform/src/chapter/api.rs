//! Chapters API
//!
//! REST endpoints for chapter management, nested under a course.

use axum::{
    extract::{State, Path},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::chapter::entity::Chapter;
use crate::{AuditService, ChapterRepository, Course, CourseRepository, LessonRepository};
use crate::shared::api_common::{CreatedResponse, SuccessResponse};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;

/// Chapter response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChapterResponse {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub description: Option<String>,
    pub position: u32,
    pub free_preview: bool,
    pub status: String,
}

impl From<Chapter> for ChapterResponse {
    fn from(c: Chapter) -> Self {
        Self {
            id: c.id,
            course_id: c.course_id,
            title: c.title,
            description: c.description,
            position: c.position,
            free_preview: c.free_preview,
            status: format!("{:?}", c.status).to_uppercase(),
        }
    }
}

/// Chapter list response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChapterListResponse {
    pub chapters: Vec<ChapterResponse>,
}

/// Create chapter request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChapterRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub free_preview: bool,
}

/// Update chapter request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChapterRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub free_preview: Option<bool>,
}

/// Reorder request: complete list of chapter IDs in the new order
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderChaptersRequest {
    pub chapter_ids: Vec<String>,
}

/// Chapters service state
#[derive(Clone)]
pub struct ChaptersState {
    pub chapter_repo: Arc<ChapterRepository>,
    pub course_repo: Arc<CourseRepository>,
    pub lesson_repo: Arc<LessonRepository>,
    pub audit_service: Arc<AuditService>,
}

async fn owned_course(
    state: &ChaptersState,
    course_id: &str,
    auth: &crate::AuthContext,
) -> Result<Course, PlatformError> {
    let course = state.course_repo.find_by_id(course_id).await?
        .ok_or_else(|| PlatformError::CourseNotFound { id: course_id.to_string() })?;

    if course.instructor_id != auth.principal_id && !auth.is_admin() {
        return Err(PlatformError::forbidden("Not the owner of this course"));
    }

    Ok(course)
}

/// Create a chapter at the end of the course
#[utoipa::path(
    post,
    path = "",
    tag = "chapters",
    operation_id = "postApiCoursesByCourseIdChapters",
    params(
        ("course_id" = String, Path, description = "Course ID")
    ),
    request_body = CreateChapterRequest,
    responses(
        (status = 201, description = "Chapter created", body = CreatedResponse),
        (status = 404, description = "Course not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_chapter(
    State(state): State<ChaptersState>,
    auth: Authenticated,
    Path(course_id): Path<String>,
    Json(req): Json<CreateChapterRequest>,
) -> Result<Json<CreatedResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_update_courses(&auth.0)?;
    owned_course(&state, &course_id, &auth.0).await?;

    let title = req.title.trim();
    if title.is_empty() {
        return Err(PlatformError::validation("Chapter title is required"));
    }

    let position = state.chapter_repo.count_by_course(&course_id).await? as u32;
    let mut chapter = Chapter::new(&course_id, title, position);
    chapter.description = req.description;
    chapter.free_preview = req.free_preview;

    let id = chapter.id.clone();
    state.chapter_repo.insert(&chapter).await?;
    state.audit_service.log_create(&auth.0, "Chapter", &id, "CreateChapterCommand").await?;

    Ok(Json(CreatedResponse::new(id)))
}

/// List chapters of a course in position order
#[utoipa::path(
    get,
    path = "",
    tag = "chapters",
    operation_id = "getApiCoursesByCourseIdChapters",
    params(
        ("course_id" = String, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "List of chapters", body = ChapterListResponse),
        (status = 404, description = "Course not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_chapters(
    State(state): State<ChaptersState>,
    auth: Authenticated,
    Path(course_id): Path<String>,
) -> Result<Json<ChapterListResponse>, PlatformError> {
    owned_course(&state, &course_id, &auth.0).await?;

    let chapters = state.chapter_repo.find_by_course(&course_id).await?;
    Ok(Json(ChapterListResponse {
        chapters: chapters.into_iter().map(|c| c.into()).collect(),
    }))
}

/// Update a chapter
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "chapters",
    operation_id = "putApiCoursesByCourseIdChaptersById",
    params(
        ("course_id" = String, Path, description = "Course ID"),
        ("id" = String, Path, description = "Chapter ID")
    ),
    request_body = UpdateChapterRequest,
    responses(
        (status = 200, description = "Chapter updated", body = ChapterResponse),
        (status = 404, description = "Chapter not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_chapter(
    State(state): State<ChaptersState>,
    auth: Authenticated,
    Path((course_id, id)): Path<(String, String)>,
    Json(req): Json<UpdateChapterRequest>,
) -> Result<Json<ChapterResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_update_courses(&auth.0)?;
    owned_course(&state, &course_id, &auth.0).await?;

    let mut chapter = state.chapter_repo.find_by_id(&id).await?
        .filter(|c| c.course_id == course_id)
        .ok_or_else(|| PlatformError::not_found("Chapter", &id))?;

    if let Some(title) = req.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(PlatformError::validation("Chapter title must not be empty"));
        }
        chapter.title = title;
    }
    if let Some(desc) = req.description {
        chapter.description = Some(desc);
    }
    if let Some(free) = req.free_preview {
        chapter.free_preview = free;
    }
    chapter.updated_at = chrono::Utc::now();

    state.chapter_repo.update(&chapter).await?;
    state.audit_service.log_update(&auth.0, "Chapter", &id, "UpdateChapterCommand").await?;

    Ok(Json(chapter.into()))
}

/// Publish a chapter
#[utoipa::path(
    post,
    path = "/{id}/publish",
    tag = "chapters",
    operation_id = "postApiCoursesByCourseIdChaptersByIdPublish",
    params(
        ("course_id" = String, Path, description = "Course ID"),
        ("id" = String, Path, description = "Chapter ID")
    ),
    responses(
        (status = 200, description = "Chapter published", body = ChapterResponse),
        (status = 404, description = "Chapter not found"),
        (status = 409, description = "Chapter has no published lessons")
    ),
    security(("bearer_auth" = []))
)]
pub async fn publish_chapter(
    State(state): State<ChaptersState>,
    auth: Authenticated,
    Path((course_id, id)): Path<(String, String)>,
) -> Result<Json<ChapterResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_update_courses(&auth.0)?;
    owned_course(&state, &course_id, &auth.0).await?;

    let mut chapter = state.chapter_repo.find_by_id(&id).await?
        .filter(|c| c.course_id == course_id)
        .ok_or_else(|| PlatformError::not_found("Chapter", &id))?;

    let published_lessons = state.lesson_repo.count_published_by_chapter(&id).await?;
    if published_lessons == 0 {
        return Err(PlatformError::validation(
            "Publish at least one lesson before publishing the chapter",
        ));
    }

    chapter.publish();
    state.chapter_repo.update(&chapter).await?;
    state.audit_service.log_update(&auth.0, "Chapter", &id, "PublishChapterCommand").await?;

    Ok(Json(chapter.into()))
}

/// Unpublish a chapter
///
/// If this was the last published chapter of a published course, the
/// course is unpublished too.
#[utoipa::path(
    post,
    path = "/{id}/unpublish",
    tag = "chapters",
    operation_id = "postApiCoursesByCourseIdChaptersByIdUnpublish",
    params(
        ("course_id" = String, Path, description = "Course ID"),
        ("id" = String, Path, description = "Chapter ID")
    ),
    responses(
        (status = 200, description = "Chapter unpublished", body = ChapterResponse),
        (status = 404, description = "Chapter not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unpublish_chapter(
    State(state): State<ChaptersState>,
    auth: Authenticated,
    Path((course_id, id)): Path<(String, String)>,
) -> Result<Json<ChapterResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_update_courses(&auth.0)?;
    let mut course = owned_course(&state, &course_id, &auth.0).await?;

    let mut chapter = state.chapter_repo.find_by_id(&id).await?
        .filter(|c| c.course_id == course_id)
        .ok_or_else(|| PlatformError::not_found("Chapter", &id))?;

    chapter.unpublish();
    state.chapter_repo.update(&chapter).await?;

    // Last published chapter gone: take the course offline as well
    if course.is_published() {
        let remaining = state.chapter_repo.count_published_by_course(&course_id).await?;
        if remaining == 0 {
            course.unpublish();
            state.course_repo.update(&course).await?;
            tracing::info!(course_id = %course_id, "Course unpublished: no published chapters remain");
        }
    }

    state.audit_service.log_update(&auth.0, "Chapter", &id, "UnpublishChapterCommand").await?;

    Ok(Json(chapter.into()))
}

/// Reorder chapters
///
/// Takes the complete list of chapter IDs in the desired order and
/// rewrites positions densely (0..n-1).
#[utoipa::path(
    post,
    path = "/reorder",
    tag = "chapters",
    operation_id = "postApiCoursesByCourseIdChaptersReorder",
    params(
        ("course_id" = String, Path, description = "Course ID")
    ),
    request_body = ReorderChaptersRequest,
    responses(
        (status = 200, description = "Chapters reordered", body = SuccessResponse),
        (status = 400, description = "ID list does not match course chapters")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reorder_chapters(
    State(state): State<ChaptersState>,
    auth: Authenticated,
    Path(course_id): Path<String>,
    Json(req): Json<ReorderChaptersRequest>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_update_courses(&auth.0)?;
    owned_course(&state, &course_id, &auth.0).await?;

    let existing = state.chapter_repo.find_by_course(&course_id).await?;
    let existing_ids: std::collections::HashSet<&str> =
        existing.iter().map(|c| c.id.as_str()).collect();

    if req.chapter_ids.len() != existing.len()
        || !req.chapter_ids.iter().all(|id| existing_ids.contains(id.as_str()))
    {
        return Err(PlatformError::validation(
            "Reorder must list every chapter of the course exactly once",
        ));
    }

    for (position, id) in req.chapter_ids.iter().enumerate() {
        state.chapter_repo.set_position(id, position as u32).await?;
    }

    state.audit_service.log_update(&auth.0, "Course", &course_id, "ReorderChaptersCommand").await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Delete a chapter and its lessons
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "chapters",
    operation_id = "deleteApiCoursesByCourseIdChaptersById",
    params(
        ("course_id" = String, Path, description = "Course ID"),
        ("id" = String, Path, description = "Chapter ID")
    ),
    responses(
        (status = 200, description = "Chapter deleted", body = SuccessResponse),
        (status = 404, description = "Chapter not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_chapter(
    State(state): State<ChaptersState>,
    auth: Authenticated,
    Path((course_id, id)): Path<(String, String)>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_update_courses(&auth.0)?;
    owned_course(&state, &course_id, &auth.0).await?;

    let chapter = state.chapter_repo.find_by_id(&id).await?
        .filter(|c| c.course_id == course_id)
        .ok_or_else(|| PlatformError::not_found("Chapter", &id))?;

    state.lesson_repo.delete_by_chapter(&chapter.id).await?;
    state.chapter_repo.delete(&id).await?;

    // Close the position gap
    let remaining = state.chapter_repo.find_by_course(&course_id).await?;
    for (position, c) in remaining.iter().enumerate() {
        if c.position != position as u32 {
            state.chapter_repo.set_position(&c.id, position as u32).await?;
        }
    }

    state.audit_service.log_delete(&auth.0, "Chapter", &id, "DeleteChapterCommand").await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Create chapters router (nested under /api/courses/{course_id}/chapters)
pub fn chapters_router(state: ChaptersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_chapter, list_chapters))
        .routes(routes!(update_chapter, delete_chapter))
        .routes(routes!(publish_chapter))
        .routes(routes!(unpublish_chapter))
        .routes(routes!(reorder_chapters))
        .with_state(state)
}
