//! Courses API
//!
//! REST endpoints for the public catalog and instructor course management.

use axum::{
    extract::{State, Path, Query},
    routing::{get, post},
    Json, Router,
};
use utoipa::{ToSchema, IntoParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{Course, CourseRepository};
use crate::course::entity::CourseStatus;
use crate::course::operations::{
    ArchiveCourseCommand, ArchiveCourseUseCase,
    CreateCourseCommand, CreateCourseUseCase,
    PublishCourseCommand, PublishCourseUseCase,
    UnpublishCourseCommand, UnpublishCourseUseCase,
    UpdateCourseCommand, UpdateCourseUseCase,
};
use crate::shared::api_common::{CreatedResponse, PaginationParams, SuccessResponse};
use crate::shared::error::PlatformError;
use crate::shared::middleware::{Authenticated, OptionalAuth};
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseResult};

/// Course response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub instructor_id: String,
    pub category_id: Option<String>,
    pub price_cents: Option<i64>,
    pub currency: String,
    pub image_asset_id: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Course> for CourseResponse {
    fn from(c: Course) -> Self {
        Self {
            id: c.id,
            title: c.title,
            slug: c.slug,
            description: c.description,
            instructor_id: c.instructor_id,
            category_id: c.category_id,
            price_cents: c.price_cents,
            currency: c.currency.code().to_string(),
            image_asset_id: c.image_asset_id,
            status: format!("{:?}", c.status).to_uppercase(),
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.to_rfc3339(),
        }
    }
}

/// Course list response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseListResponse {
    pub courses: Vec<CourseResponse>,
    pub total: u64,
}

/// Create course request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Update course request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
    pub image_asset_id: Option<String>,
}

/// Query parameters for the course catalog
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CoursesQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Filter by category ID
    pub category_id: Option<String>,

    /// Case-insensitive title search
    pub search: Option<String>,

    /// Restrict to the caller's own courses (instructors)
    #[serde(default)]
    pub mine: bool,
}

/// Delete query
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteCourseQuery {
    /// Hard-delete a draft instead of archiving
    #[serde(default)]
    pub delete: bool,
}

/// Courses service state
#[derive(Clone)]
pub struct CoursesState<U: UnitOfWork + 'static> {
    pub course_repo: Arc<CourseRepository>,
    pub create_use_case: Arc<CreateCourseUseCase<U>>,
    pub update_use_case: Arc<UpdateCourseUseCase<U>>,
    pub publish_use_case: Arc<PublishCourseUseCase<U>>,
    pub unpublish_use_case: Arc<UnpublishCourseUseCase<U>>,
    pub archive_use_case: Arc<ArchiveCourseUseCase<U>>,
}

fn require_ownership(course: &Course, auth: &crate::AuthContext) -> Result<(), PlatformError> {
    if course.instructor_id != auth.principal_id && !auth.is_admin() {
        return Err(PlatformError::forbidden("Not the owner of this course"));
    }
    Ok(())
}

/// Create a new draft course
#[utoipa::path(
    post,
    path = "",
    tag = "courses",
    operation_id = "postApiCourses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CreatedResponse),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_course<U: UnitOfWork>(
    State(state): State<CoursesState<U>>,
    auth: Authenticated,
    Json(req): Json<CreateCourseRequest>,
) -> Result<Json<CreatedResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_author_courses(&auth.0)?;

    let command = CreateCourseCommand {
        title: req.title,
        description: req.description,
        category_id: req.category_id,
        price_cents: req.price_cents,
        currency: req.currency,
    };

    let ctx = ExecutionContext::create(&auth.0.principal_id);
    match state.create_use_case.execute(command, ctx).await {
        UseCaseResult::Success(event) => Ok(Json(CreatedResponse::new(event.course_id))),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// List courses
///
/// Without `mine`, returns the public catalog (published courses only).
/// With `mine=true`, returns all of the caller's courses in any status.
#[utoipa::path(
    get,
    path = "",
    tag = "courses",
    operation_id = "getApiCourses",
    params(CoursesQuery),
    responses(
        (status = 200, description = "List of courses", body = CourseListResponse)
    )
)]
pub async fn list_courses<U: UnitOfWork>(
    State(state): State<CoursesState<U>>,
    auth: OptionalAuth,
    Query(query): Query<CoursesQuery>,
) -> Result<Json<CourseListResponse>, PlatformError> {
    if query.mine {
        let Some(ref ctx) = auth.0 else {
            return Err(PlatformError::unauthorized("Authentication required for mine=true"));
        };
        crate::shared::authorization_service::checks::can_author_courses(ctx)?;

        let courses = state.course_repo.find_by_instructor(&ctx.principal_id).await?;
        let total = courses.len() as u64;
        return Ok(Json(CourseListResponse {
            courses: courses.into_iter().map(|c| c.into()).collect(),
            total,
        }));
    }

    let courses = state.course_repo.find_published(
        query.category_id.as_deref(),
        query.search.as_deref(),
        query.pagination.offset(),
        query.pagination.limit(),
    ).await?;
    let total = state.course_repo.count_published(
        query.category_id.as_deref(),
        query.search.as_deref(),
    ).await?;

    Ok(Json(CourseListResponse {
        courses: courses.into_iter().map(|c| c.into()).collect(),
        total,
    }))
}

/// Get course by ID
///
/// Published courses are visible to everyone; drafts and archived courses
/// only to their owner or an admin.
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "courses",
    operation_id = "getApiCoursesById",
    params(
        ("id" = String, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course found", body = CourseResponse),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course<U: UnitOfWork>(
    State(state): State<CoursesState<U>>,
    auth: OptionalAuth,
    Path(id): Path<String>,
) -> Result<Json<CourseResponse>, PlatformError> {
    let course = state.course_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::CourseNotFound { id: id.clone() })?;

    if course.status != CourseStatus::Published {
        let Some(ref ctx) = auth.0 else {
            return Err(PlatformError::CourseNotFound { id });
        };
        if course.instructor_id != ctx.principal_id && !ctx.is_admin() {
            return Err(PlatformError::CourseNotFound { id });
        }
    }

    Ok(Json(course.into()))
}

/// Update course fields
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "courses",
    operation_id = "putApiCoursesById",
    params(
        ("id" = String, Path, description = "Course ID")
    ),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 404, description = "Course not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_course<U: UnitOfWork>(
    State(state): State<CoursesState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<Json<CourseResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_update_courses(&auth.0)?;

    let course = state.course_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::CourseNotFound { id: id.clone() })?;
    require_ownership(&course, &auth.0)?;

    let command = UpdateCourseCommand {
        course_id: id.clone(),
        title: req.title,
        description: req.description,
        category_id: req.category_id,
        price_cents: req.price_cents,
        currency: req.currency,
        image_asset_id: req.image_asset_id,
    };

    let ctx = ExecutionContext::create(&auth.0.principal_id);
    match state.update_use_case.execute(command, ctx).await {
        UseCaseResult::Success(_) => {
            let updated = state.course_repo.find_by_id(&id).await?
                .ok_or_else(|| PlatformError::CourseNotFound { id })?;
            Ok(Json(updated.into()))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Publish a course
#[utoipa::path(
    post,
    path = "/{id}/publish",
    tag = "courses",
    operation_id = "postApiCoursesByIdPublish",
    params(
        ("id" = String, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course published", body = CourseResponse),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Course not publishable")
    ),
    security(("bearer_auth" = []))
)]
pub async fn publish_course<U: UnitOfWork>(
    State(state): State<CoursesState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<CourseResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_publish_courses(&auth.0)?;

    let course = state.course_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::CourseNotFound { id: id.clone() })?;
    require_ownership(&course, &auth.0)?;

    let ctx = ExecutionContext::create(&auth.0.principal_id);
    match state.publish_use_case.execute(PublishCourseCommand { course_id: id.clone() }, ctx).await {
        UseCaseResult::Success(_) => {
            let updated = state.course_repo.find_by_id(&id).await?
                .ok_or_else(|| PlatformError::CourseNotFound { id })?;
            Ok(Json(updated.into()))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Unpublish a course
#[utoipa::path(
    post,
    path = "/{id}/unpublish",
    tag = "courses",
    operation_id = "postApiCoursesByIdUnpublish",
    params(
        ("id" = String, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course unpublished", body = CourseResponse),
        (status = 404, description = "Course not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unpublish_course<U: UnitOfWork>(
    State(state): State<CoursesState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<CourseResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_publish_courses(&auth.0)?;

    let course = state.course_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::CourseNotFound { id: id.clone() })?;
    require_ownership(&course, &auth.0)?;

    let ctx = ExecutionContext::create(&auth.0.principal_id);
    match state.unpublish_use_case.execute(UnpublishCourseCommand { course_id: id.clone() }, ctx).await {
        UseCaseResult::Success(_) => {
            let updated = state.course_repo.find_by_id(&id).await?
                .ok_or_else(|| PlatformError::CourseNotFound { id })?;
            Ok(Json(updated.into()))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Archive or delete a course
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "courses",
    operation_id = "deleteApiCoursesById",
    params(
        ("id" = String, Path, description = "Course ID"),
        DeleteCourseQuery
    ),
    responses(
        (status = 200, description = "Course archived or deleted", body = SuccessResponse),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Course has enrollments")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_course<U: UnitOfWork>(
    State(state): State<CoursesState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
    Query(query): Query<DeleteCourseQuery>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_delete_courses(&auth.0)?;

    let course = state.course_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::CourseNotFound { id: id.clone() })?;
    require_ownership(&course, &auth.0)?;

    let command = ArchiveCourseCommand {
        course_id: id,
        delete: query.delete,
    };

    let ctx = ExecutionContext::create(&auth.0.principal_id);
    match state.archive_use_case.execute(command, ctx).await {
        UseCaseResult::Success(_) => Ok(Json(SuccessResponse::ok())),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Create courses router
///
/// The path parameter is named `course_id` to line up with the nested
/// chapter and checkout routers mounted under the same prefix.
pub fn courses_router<U: UnitOfWork + Clone>(state: CoursesState<U>) -> Router {
    Router::new()
        .route("/", get(list_courses::<U>).post(create_course::<U>))
        .route("/:course_id", get(get_course::<U>).put(update_course::<U>).delete(delete_course::<U>))
        .route("/:course_id/publish", post(publish_course::<U>))
        .route("/:course_id/unpublish", post(unpublish_course::<U>))
        .with_state(state)
}
