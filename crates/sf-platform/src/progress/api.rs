//! Progress API
//!
//! Playback heartbeats, completion toggles, and per-course summaries.

use axum::{
    extract::{State, Path},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::progress::entity::{completion_percent, LessonProgress};
use crate::{
    ChapterRepository, EnrollmentRepository, Lesson, LessonRepository, ProgressRepository,
};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;

/// Playback heartbeat request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRequest {
    pub lesson_id: String,
    /// Current playback position in seconds
    pub position_seconds: u32,
    /// Seconds actually watched since the previous heartbeat
    pub watched_delta_seconds: u32,
}

/// Completion toggle request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub lesson_id: String,
    pub completed: bool,
}

/// Progress record response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub lesson_id: String,
    pub course_id: String,
    pub completed: bool,
    pub watch_seconds: u64,
    pub last_position_seconds: u32,
    pub completed_at: Option<String>,
}

impl From<LessonProgress> for ProgressResponse {
    fn from(p: LessonProgress) -> Self {
        Self {
            lesson_id: p.lesson_id,
            course_id: p.course_id,
            completed: p.completed,
            watch_seconds: p.watch_seconds,
            last_position_seconds: p.last_position_seconds,
            completed_at: p.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Per-course progress summary
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgressResponse {
    pub course_id: String,
    pub completed_lessons: u64,
    pub total_published_lessons: u64,
    pub percent: f64,
    pub lessons: Vec<ProgressResponse>,
}

/// Progress service state
#[derive(Clone)]
pub struct ProgressState {
    pub progress_repo: Arc<ProgressRepository>,
    pub lesson_repo: Arc<LessonRepository>,
    pub chapter_repo: Arc<ChapterRepository>,
    pub enrollment_repo: Arc<EnrollmentRepository>,
}

/// Verify the caller may play this lesson: active enrollment, or
/// free-preview chapter with both chapter and lesson published.
async fn require_lesson_access(
    state: &ProgressState,
    auth: &crate::AuthContext,
    lesson: &Lesson,
) -> Result<(), PlatformError> {
    if !lesson.is_published() {
        return Err(PlatformError::not_found("Lesson", &lesson.id));
    }

    let enrolled = state.enrollment_repo
        .find_active(&auth.principal_id, &lesson.course_id)
        .await?
        .is_some();
    if enrolled {
        return Ok(());
    }

    let chapter = state.chapter_repo.find_by_id(&lesson.chapter_id).await?
        .ok_or_else(|| PlatformError::not_found("Chapter", &lesson.chapter_id))?;
    if chapter.free_preview && chapter.is_published() {
        return Ok(());
    }

    Err(PlatformError::NotEnrolled { course_id: lesson.course_id.clone() })
}

/// Record a playback heartbeat
#[utoipa::path(
    post,
    path = "/heartbeat",
    tag = "progress",
    operation_id = "postApiProgressHeartbeat",
    request_body = HeartbeatRequest,
    responses(
        (status = 200, description = "Heartbeat recorded", body = ProgressResponse),
        (status = 403, description = "Not enrolled"),
        (status = 404, description = "Lesson not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn heartbeat(
    State(state): State<ProgressState>,
    auth: Authenticated,
    Json(req): Json<HeartbeatRequest>,
) -> Result<Json<ProgressResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_record_progress(&auth.0)?;

    let lesson = state.lesson_repo.find_by_id(&req.lesson_id).await?
        .ok_or_else(|| PlatformError::not_found("Lesson", &req.lesson_id))?;
    require_lesson_access(&state, &auth.0, &lesson).await?;

    // Clamp the reported delta to a plausible ceiling: no heartbeat can
    // account for more than the lesson's duration.
    let max_delta = lesson.duration_seconds.max(1);
    let delta = req.watched_delta_seconds.min(max_delta);

    let mut progress = match state.progress_repo
        .find_by_student_and_lesson(&auth.0.principal_id, &req.lesson_id)
        .await?
    {
        Some(p) => p,
        None => {
            let p = LessonProgress::new(&auth.0.principal_id, &req.lesson_id, &lesson.course_id);
            state.progress_repo.insert(&p).await?;
            p
        }
    };

    progress.record_heartbeat(req.position_seconds, delta);
    state.progress_repo.update(&progress).await?;

    Ok(Json(progress.into()))
}

/// Mark a lesson complete or incomplete
#[utoipa::path(
    post,
    path = "/complete",
    tag = "progress",
    operation_id = "postApiProgressComplete",
    request_body = CompletionRequest,
    responses(
        (status = 200, description = "Completion updated", body = ProgressResponse),
        (status = 403, description = "Not enrolled"),
        (status = 404, description = "Lesson not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_completion(
    State(state): State<ProgressState>,
    auth: Authenticated,
    Json(req): Json<CompletionRequest>,
) -> Result<Json<ProgressResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_record_progress(&auth.0)?;

    let lesson = state.lesson_repo.find_by_id(&req.lesson_id).await?
        .ok_or_else(|| PlatformError::not_found("Lesson", &req.lesson_id))?;
    require_lesson_access(&state, &auth.0, &lesson).await?;

    let mut progress = match state.progress_repo
        .find_by_student_and_lesson(&auth.0.principal_id, &req.lesson_id)
        .await?
    {
        Some(p) => p,
        None => {
            let p = LessonProgress::new(&auth.0.principal_id, &req.lesson_id, &lesson.course_id);
            state.progress_repo.insert(&p).await?;
            p
        }
    };

    if req.completed {
        progress.mark_complete();
    } else {
        progress.mark_incomplete();
    }
    state.progress_repo.update(&progress).await?;

    Ok(Json(progress.into()))
}

/// Per-course progress summary for the caller
#[utoipa::path(
    get,
    path = "/course/{course_id}",
    tag = "progress",
    operation_id = "getApiProgressCourseByCourseId",
    params(
        ("course_id" = String, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Progress summary", body = CourseProgressResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn course_progress(
    State(state): State<ProgressState>,
    auth: Authenticated,
    Path(course_id): Path<String>,
) -> Result<Json<CourseProgressResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_read_progress(&auth.0)?;

    let records = state.progress_repo
        .find_by_student_and_course(&auth.0.principal_id, &course_id)
        .await?;
    let total_published = state.lesson_repo.count_published_by_course(&course_id).await?;
    let completed = records.iter().filter(|p| p.completed).count() as u64;

    Ok(Json(CourseProgressResponse {
        course_id,
        completed_lessons: completed,
        total_published_lessons: total_published,
        percent: completion_percent(completed, total_published),
        lessons: records.into_iter().map(|p| p.into()).collect(),
    }))
}

/// Create progress router
pub fn progress_router(state: ProgressState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(heartbeat))
        .routes(routes!(set_completion))
        .routes(routes!(course_progress))
        .with_state(state)
}
