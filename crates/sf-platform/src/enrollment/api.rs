//! Enrollments API

use axum::{
    extract::{State, Path, Query},
    routing::{get, post},
    Json, Router,
};
use utoipa::{ToSchema, IntoParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::enrollment::entity::Enrollment;
use crate::enrollment::operations::{
    EnrollCommand, EnrollUseCase, RevokeEnrollmentCommand, RevokeEnrollmentUseCase,
};
use crate::{CourseRepository, EnrollmentRepository};
use crate::shared::api_common::{CreatedResponse, PaginationParams, SuccessResponse};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseResult};

/// Enrollment response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResponse {
    pub id: String,
    pub course_id: String,
    pub student_id: String,
    pub source: String,
    pub status: String,
    pub checkout_id: Option<String>,
    pub created_at: String,
}

impl From<Enrollment> for EnrollmentResponse {
    fn from(e: Enrollment) -> Self {
        Self {
            id: e.id,
            course_id: e.course_id,
            student_id: e.student_id,
            source: format!("{:?}", e.source).to_uppercase(),
            status: format!("{:?}", e.status).to_uppercase(),
            checkout_id: e.checkout_id,
            created_at: e.created_at.to_rfc3339(),
        }
    }
}

/// Enrollment list response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentListResponse {
    pub enrollments: Vec<EnrollmentResponse>,
    pub total: u64,
}

/// Self-service enrollment request (free courses)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub course_id: String,
}

/// Grant request (instructor/admin)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrantEnrollmentRequest {
    pub course_id: String,
    pub student_id: String,
}

/// Query for listing course enrollments
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CourseEnrollmentsQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Enrollments service state
#[derive(Clone)]
pub struct EnrollmentsState<U: UnitOfWork + 'static> {
    pub enrollment_repo: Arc<EnrollmentRepository>,
    pub course_repo: Arc<CourseRepository>,
    pub enroll_use_case: Arc<EnrollUseCase<U>>,
    pub revoke_use_case: Arc<RevokeEnrollmentUseCase<U>>,
}

/// Enroll into a free course
#[utoipa::path(
    post,
    path = "",
    tag = "enrollments",
    operation_id = "postApiEnrollments",
    request_body = EnrollRequest,
    responses(
        (status = 201, description = "Enrolled", body = CreatedResponse),
        (status = 409, description = "Already enrolled or course requires purchase")
    ),
    security(("bearer_auth" = []))
)]
pub async fn enroll<U: UnitOfWork>(
    State(state): State<EnrollmentsState<U>>,
    auth: Authenticated,
    Json(req): Json<EnrollRequest>,
) -> Result<Json<CreatedResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_enroll(&auth.0)?;

    let command = EnrollCommand {
        course_id: req.course_id,
        student_id: auth.0.principal_id.clone(),
        granted: false,
    };

    let ctx = ExecutionContext::create(&auth.0.principal_id);
    match state.enroll_use_case.execute(command, ctx).await {
        UseCaseResult::Success(event) => Ok(Json(CreatedResponse::new(event.enrollment_id))),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Grant enrollment to a student (instructor/admin)
#[utoipa::path(
    post,
    path = "/grant",
    tag = "enrollments",
    operation_id = "postApiEnrollmentsGrant",
    request_body = GrantEnrollmentRequest,
    responses(
        (status = 201, description = "Enrollment granted", body = CreatedResponse),
        (status = 403, description = "Not the course owner"),
        (status = 409, description = "Already enrolled")
    ),
    security(("bearer_auth" = []))
)]
pub async fn grant_enrollment<U: UnitOfWork>(
    State(state): State<EnrollmentsState<U>>,
    auth: Authenticated,
    Json(req): Json<GrantEnrollmentRequest>,
) -> Result<Json<CreatedResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_grant_enrollments(&auth.0)?;

    // Instructors may only grant access to their own courses
    let course = state.course_repo.find_by_id(&req.course_id).await?
        .ok_or_else(|| PlatformError::CourseNotFound { id: req.course_id.clone() })?;
    if course.instructor_id != auth.0.principal_id && !auth.0.is_admin() {
        return Err(PlatformError::forbidden("Not the owner of this course"));
    }

    let command = EnrollCommand {
        course_id: req.course_id,
        student_id: req.student_id,
        granted: true,
    };

    let ctx = ExecutionContext::create(&auth.0.principal_id);
    match state.enroll_use_case.execute(command, ctx).await {
        UseCaseResult::Success(event) => Ok(Json(CreatedResponse::new(event.enrollment_id))),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// List the caller's enrollments
#[utoipa::path(
    get,
    path = "/mine",
    tag = "enrollments",
    operation_id = "getApiEnrollmentsMine",
    responses(
        (status = 200, description = "List of enrollments", body = EnrollmentListResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_enrollments<U: UnitOfWork>(
    State(state): State<EnrollmentsState<U>>,
    auth: Authenticated,
) -> Result<Json<EnrollmentListResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_read_enrollments(&auth.0)?;

    let enrollments = state.enrollment_repo.find_by_student(&auth.0.principal_id).await?;
    let total = enrollments.len() as u64;

    Ok(Json(EnrollmentListResponse {
        enrollments: enrollments.into_iter().map(|e| e.into()).collect(),
        total,
    }))
}

/// List enrollments of a course (instructor/admin)
#[utoipa::path(
    get,
    path = "/course/{course_id}",
    tag = "enrollments",
    operation_id = "getApiEnrollmentsCourseByCourseId",
    params(
        ("course_id" = String, Path, description = "Course ID"),
        CourseEnrollmentsQuery
    ),
    responses(
        (status = 200, description = "List of enrollments", body = EnrollmentListResponse),
        (status = 403, description = "Not the course owner")
    ),
    security(("bearer_auth" = []))
)]
pub async fn course_enrollments<U: UnitOfWork>(
    State(state): State<EnrollmentsState<U>>,
    auth: Authenticated,
    Path(course_id): Path<String>,
    Query(query): Query<CourseEnrollmentsQuery>,
) -> Result<Json<EnrollmentListResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_read_enrollments(&auth.0)?;

    let course = state.course_repo.find_by_id(&course_id).await?
        .ok_or_else(|| PlatformError::CourseNotFound { id: course_id.clone() })?;
    if course.instructor_id != auth.0.principal_id && !auth.0.is_admin() {
        return Err(PlatformError::forbidden("Not the owner of this course"));
    }

    let enrollments = state.enrollment_repo.find_by_course(
        &course_id,
        query.pagination.offset(),
        query.pagination.limit(),
    ).await?;
    let total = state.enrollment_repo.count_by_course(&course_id).await?;

    Ok(Json(EnrollmentListResponse {
        enrollments: enrollments.into_iter().map(|e| e.into()).collect(),
        total,
    }))
}

/// Revoke an enrollment (instructor/admin)
#[utoipa::path(
    post,
    path = "/{id}/revoke",
    tag = "enrollments",
    operation_id = "postApiEnrollmentsByIdRevoke",
    params(
        ("id" = String, Path, description = "Enrollment ID")
    ),
    responses(
        (status = 200, description = "Enrollment revoked", body = SuccessResponse),
        (status = 404, description = "Enrollment not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn revoke_enrollment<U: UnitOfWork>(
    State(state): State<EnrollmentsState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_revoke_enrollments(&auth.0)?;

    let enrollment = state.enrollment_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::EnrollmentNotFound { id: id.clone() })?;

    // Instructors may only revoke enrollments in their own courses
    let course = state.course_repo.find_by_id(&enrollment.course_id).await?
        .ok_or_else(|| PlatformError::CourseNotFound { id: enrollment.course_id.clone() })?;
    if course.instructor_id != auth.0.principal_id && !auth.0.is_admin() {
        return Err(PlatformError::forbidden("Not the owner of this course"));
    }

    let ctx = ExecutionContext::create(&auth.0.principal_id);
    match state.revoke_use_case.execute(RevokeEnrollmentCommand { enrollment_id: id }, ctx).await {
        UseCaseResult::Success(_) => Ok(Json(SuccessResponse::ok())),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Create enrollments router
pub fn enrollments_router<U: UnitOfWork + Clone>(state: EnrollmentsState<U>) -> Router {
    Router::new()
        .route("/", post(enroll::<U>))
        .route("/grant", post(grant_enrollment::<U>))
        .route("/mine", get(my_enrollments::<U>))
        .route("/course/:course_id", get(course_enrollments::<U>))
        .route("/:id/revoke", post(revoke_enrollment::<U>))
        .with_state(state)
}
