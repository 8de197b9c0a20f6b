//! Roles Admin API
//!
//! Read-only endpoints for inspecting roles and their permissions.

use axum::{
    extract::{State, Path},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::ToSchema;
use serde::Serialize;
use std::sync::Arc;

use crate::AuthRole;
use crate::RoleRepository;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;

/// Role response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: String,
    pub code: String,
    pub display_name: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
    pub source: String,
}

impl From<AuthRole> for RoleResponse {
    fn from(role: AuthRole) -> Self {
        let mut permissions: Vec<String> = role.permissions.into_iter().collect();
        permissions.sort();
        Self {
            id: role.id,
            code: role.code,
            display_name: role.display_name,
            description: role.description,
            permissions,
            source: format!("{:?}", role.source).to_uppercase(),
        }
    }
}

/// Roles list response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleListResponse {
    pub roles: Vec<RoleResponse>,
    pub total: usize,
}

/// Roles service state
#[derive(Clone)]
pub struct RolesState {
    pub role_repo: Arc<RoleRepository>,
}

/// List all roles
#[utoipa::path(
    get,
    path = "",
    tag = "roles",
    operation_id = "getApiRoles",
    responses(
        (status = 200, description = "List of roles", body = RoleListResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_roles(
    State(state): State<RolesState>,
    auth: Authenticated,
) -> Result<Json<RoleListResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_read_roles(&auth.0)?;

    let roles = state.role_repo.find_all().await?;
    let total = roles.len();

    Ok(Json(RoleListResponse {
        roles: roles.into_iter().map(|r| r.into()).collect(),
        total,
    }))
}

/// Get role by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "roles",
    operation_id = "getApiRolesById",
    params(
        ("id" = String, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role found", body = RoleResponse),
        (status = 404, description = "Role not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_role(
    State(state): State<RolesState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<RoleResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_read_roles(&auth.0)?;

    let role = state.role_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::not_found("Role", &id))?;

    Ok(Json(role.into()))
}

/// Create roles router
pub fn roles_router(state: RolesState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_roles))
        .routes(routes!(get_role))
        .with_state(state)
}
