//! Analytics API
//!
//! Dashboard endpoints for instructors and admins.

use axum::{
    extract::{State, Path, Query},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::IntoParams;
use serde::Deserialize;
use std::sync::Arc;

use crate::analytics::period::Period;
use crate::analytics::service::{AnalyticsService, CoursePerformance, Dashboard};
use crate::CourseRepository;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;

/// Period selection query
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    /// Reporting window: 30d (default), 90d, or month
    pub period: Option<String>,
}

impl PeriodQuery {
    fn resolve(&self) -> Result<Period, PlatformError> {
        let selector = self.period.as_deref().unwrap_or("30d");
        Period::parse(selector, chrono::Utc::now())
    }
}

/// Analytics service state
#[derive(Clone)]
pub struct AnalyticsState {
    pub analytics: Arc<AnalyticsService>,
    pub course_repo: Arc<CourseRepository>,
}

/// Instructor dashboard over the caller's courses
#[utoipa::path(
    get,
    path = "/instructor",
    tag = "analytics",
    operation_id = "getApiAnalyticsInstructor",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Dashboard", body = Dashboard)
    ),
    security(("bearer_auth" = []))
)]
pub async fn instructor_dashboard(
    State(state): State<AnalyticsState>,
    auth: Authenticated,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Dashboard>, PlatformError> {
    crate::shared::authorization_service::checks::can_view_analytics(&auth.0)?;

    let period = query.resolve()?;
    let dashboard = state.analytics.instructor_dashboard(&auth.0.principal_id, period).await?;

    Ok(Json(dashboard))
}

/// Per-course performance (owner or admin)
#[utoipa::path(
    get,
    path = "/courses/{id}",
    tag = "analytics",
    operation_id = "getApiAnalyticsCoursesById",
    params(
        ("id" = String, Path, description = "Course ID"),
        PeriodQuery
    ),
    responses(
        (status = 200, description = "Course performance", body = CoursePerformance),
        (status = 404, description = "Course not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn course_performance(
    State(state): State<AnalyticsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<CoursePerformance>, PlatformError> {
    crate::shared::authorization_service::checks::can_view_analytics(&auth.0)?;

    let course = state.course_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::CourseNotFound { id: id.clone() })?;
    if course.instructor_id != auth.0.principal_id && !auth.0.is_admin() {
        return Err(PlatformError::forbidden("Not the owner of this course"));
    }

    let period = query.resolve()?;
    let performance = state.analytics.course_performance(&course, period).await?;

    Ok(Json(performance))
}

/// Platform-wide dashboard (admin only)
#[utoipa::path(
    get,
    path = "/admin",
    tag = "analytics",
    operation_id = "getApiAnalyticsAdmin",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Platform dashboard", body = Dashboard)
    ),
    security(("bearer_auth" = []))
)]
pub async fn admin_dashboard(
    State(state): State<AnalyticsState>,
    auth: Authenticated,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Dashboard>, PlatformError> {
    crate::shared::authorization_service::checks::can_view_admin_analytics(&auth.0)?;

    let period = query.resolve()?;
    let dashboard = state.analytics.admin_dashboard(period).await?;

    Ok(Json(dashboard))
}

/// Create analytics router
pub fn analytics_router(state: AnalyticsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(instructor_dashboard))
        .routes(routes!(course_performance))
        .routes(routes!(admin_dashboard))
        .with_state(state)
}
