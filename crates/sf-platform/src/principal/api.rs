//! Principals Admin API
//!
//! REST endpoints for user administration.

use axum::{
    extract::{State, Path, Query},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::{ToSchema, IntoParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{Principal, UserScope};
use crate::PrincipalRepository;
use crate::AuditService;
use crate::shared::error::PlatformError;
use crate::shared::api_common::{PaginationParams, SuccessResponse};
use crate::shared::middleware::Authenticated;

/// Principal response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalResponse {
    pub id: String,
    pub external_id: Option<String>,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub scope: String,
    pub roles: Vec<String>,
    pub active: bool,
    pub last_login_at: Option<String>,
    pub created_at: String,
}

impl From<Principal> for PrincipalResponse {
    fn from(p: Principal) -> Self {
        Self {
            id: p.id,
            external_id: p.external_id,
            email: p.email,
            display_name: p.display_name,
            avatar_url: p.avatar_url,
            scope: p.scope.as_str().to_string(),
            roles: p.roles,
            active: p.active,
            last_login_at: p.last_login_at.map(|t| t.to_rfc3339()),
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Principals list response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalListResponse {
    pub principals: Vec<PrincipalResponse>,
    pub total: u64,
}

/// Update principal request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePrincipalRequest {
    /// New display name
    pub display_name: Option<String>,
    /// New scope: ADMIN, INSTRUCTOR, STUDENT
    pub scope: Option<String>,
}

/// Query parameters for principal listing
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PrincipalsQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Search prefix against email or display name
    pub search: Option<String>,
}

/// Principals service state
#[derive(Clone)]
pub struct PrincipalsState {
    pub principal_repo: Arc<PrincipalRepository>,
    pub audit_service: Arc<AuditService>,
}

/// List principals
#[utoipa::path(
    get,
    path = "",
    tag = "principals",
    operation_id = "getApiPrincipals",
    params(PrincipalsQuery),
    responses(
        (status = 200, description = "List of principals", body = PrincipalListResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_principals(
    State(state): State<PrincipalsState>,
    auth: Authenticated,
    Query(query): Query<PrincipalsQuery>,
) -> Result<Json<PrincipalListResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_read_users(&auth.0)?;

    let principals = if let Some(ref search) = query.search {
        state.principal_repo.search_by_name_or_email(search, query.pagination.limit()).await?
    } else {
        state.principal_repo.find_page(query.pagination.offset(), query.pagination.limit()).await?
    };
    let total = state.principal_repo.count().await?;

    Ok(Json(PrincipalListResponse {
        principals: principals.into_iter().map(|p| p.into()).collect(),
        total,
    }))
}

/// Get principal by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "principals",
    operation_id = "getApiPrincipalsById",
    params(
        ("id" = String, Path, description = "Principal ID")
    ),
    responses(
        (status = 200, description = "Principal found", body = PrincipalResponse),
        (status = 404, description = "Principal not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_principal(
    State(state): State<PrincipalsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<PrincipalResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_read_users(&auth.0)?;

    let principal = state.principal_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::PrincipalNotFound { id: id.clone() })?;

    Ok(Json(principal.into()))
}

/// Update principal scope or profile
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "principals",
    operation_id = "putApiPrincipalsById",
    params(
        ("id" = String, Path, description = "Principal ID")
    ),
    request_body = UpdatePrincipalRequest,
    responses(
        (status = 200, description = "Principal updated", body = PrincipalResponse),
        (status = 404, description = "Principal not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_principal(
    State(state): State<PrincipalsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdatePrincipalRequest>,
) -> Result<Json<PrincipalResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_write_users(&auth.0)?;

    let mut principal = state.principal_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::PrincipalNotFound { id: id.clone() })?;

    if let Some(name) = req.display_name {
        principal.display_name = name;
        principal.updated_at = chrono::Utc::now();
    }
    if let Some(scope_str) = req.scope {
        let scope = UserScope::parse(&scope_str)
            .ok_or_else(|| PlatformError::validation(format!(
                "Invalid scope: {}. Valid options: ADMIN, INSTRUCTOR, STUDENT", scope_str
            )))?;
        principal.change_scope(scope);
    }

    state.principal_repo.update(&principal).await?;
    state.audit_service.log_update(&auth.0, "Principal", &id, "UpdatePrincipalCommand").await?;

    Ok(Json(principal.into()))
}

/// Deactivate a principal
#[utoipa::path(
    post,
    path = "/{id}/deactivate",
    tag = "principals",
    operation_id = "postApiPrincipalsByIdDeactivate",
    params(
        ("id" = String, Path, description = "Principal ID")
    ),
    responses(
        (status = 200, description = "Principal deactivated", body = SuccessResponse),
        (status = 404, description = "Principal not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn deactivate_principal(
    State(state): State<PrincipalsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_write_users(&auth.0)?;

    if auth.0.principal_id == id {
        return Err(PlatformError::validation("Cannot deactivate your own account"));
    }

    let mut principal = state.principal_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::PrincipalNotFound { id: id.clone() })?;

    principal.deactivate();
    state.principal_repo.update(&principal).await?;
    state.audit_service.log_update(&auth.0, "Principal", &id, "DeactivatePrincipalCommand").await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Reactivate a principal
#[utoipa::path(
    post,
    path = "/{id}/activate",
    tag = "principals",
    operation_id = "postApiPrincipalsByIdActivate",
    params(
        ("id" = String, Path, description = "Principal ID")
    ),
    responses(
        (status = 200, description = "Principal activated", body = SuccessResponse),
        (status = 404, description = "Principal not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn activate_principal(
    State(state): State<PrincipalsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_write_users(&auth.0)?;

    let mut principal = state.principal_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::PrincipalNotFound { id: id.clone() })?;

    principal.activate();
    state.principal_repo.update(&principal).await?;
    state.audit_service.log_update(&auth.0, "Principal", &id, "ActivatePrincipalCommand").await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Create principals router
pub fn principals_router(state: PrincipalsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_principals))
        .routes(routes!(get_principal, update_principal))
        .routes(routes!(deactivate_principal))
        .routes(routes!(activate_principal))
        .with_state(state)
}
