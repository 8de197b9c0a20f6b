//! Audit Logs Admin API
//!
//! REST endpoints for viewing audit logs.

use axum::{
    extract::{State, Path, Query},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::{ToSchema, IntoParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AuditLog;
use crate::AuditLogRepository;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;

/// Audit log response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogResponse {
    pub id: String,
    pub operation: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub principal_id: Option<String>,
    pub performed_at: String,
}

impl From<AuditLog> for AuditLogResponse {
    fn from(log: AuditLog) -> Self {
        Self {
            id: log.id,
            operation: log.operation,
            entity_type: log.entity_type,
            entity_id: log.entity_id,
            principal_id: log.principal_id,
            performed_at: log.performed_at.to_rfc3339(),
        }
    }
}

/// Audit log detail response (includes operation JSON)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogDetailResponse {
    pub id: String,
    pub operation: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub operation_json: Option<String>,
    pub principal_id: Option<String>,
    pub performed_at: String,
}

impl From<AuditLog> for AuditLogDetailResponse {
    fn from(log: AuditLog) -> Self {
        Self {
            id: log.id,
            operation: log.operation,
            entity_type: log.entity_type,
            entity_id: log.entity_id,
            operation_json: log.operation_json,
            principal_id: log.principal_id,
            performed_at: log.performed_at.to_rfc3339(),
        }
    }
}

/// Audit logs list response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogListResponse {
    pub audit_logs: Vec<AuditLogResponse>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Entity types response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityTypesResponse {
    pub entity_types: Vec<String>,
}

/// Query parameters for audit logs
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AuditLogsQuery {
    /// Page number (0-based)
    #[serde(default)]
    pub page: u32,
    /// Page size
    pub page_size: Option<u32>,
    /// Filter by entity type
    pub entity_type: Option<String>,
    /// Filter by entity ID
    pub entity_id: Option<String>,
    /// Filter by operation name
    pub operation: Option<String>,
    /// Filter by principal
    pub principal_id: Option<String>,
}

/// Audit logs service state
#[derive(Clone)]
pub struct AuditLogsState {
    pub audit_log_repo: Arc<AuditLogRepository>,
}

/// List audit logs with filters
#[utoipa::path(
    get,
    path = "",
    tag = "audit-logs",
    operation_id = "getApiAuditLogs",
    params(AuditLogsQuery),
    responses(
        (status = 200, description = "List of audit logs", body = AuditLogListResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_audit_logs(
    State(state): State<AuditLogsState>,
    auth: Authenticated,
    Query(query): Query<AuditLogsQuery>,
) -> Result<Json<AuditLogListResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_read_audit_logs(&auth.0)?;

    let page_size = query.page_size.unwrap_or(50).min(200);
    let skip = (query.page as u64) * (page_size as u64);

    let logs = state.audit_log_repo.search(
        query.entity_type.as_deref(),
        query.entity_id.as_deref(),
        query.operation.as_deref(),
        query.principal_id.as_deref(),
        skip,
        page_size as i64,
    ).await?;

    let total = state.audit_log_repo.count_with_filters(
        query.entity_type.as_deref(),
        query.entity_id.as_deref(),
        query.operation.as_deref(),
        query.principal_id.as_deref(),
    ).await?;

    Ok(Json(AuditLogListResponse {
        audit_logs: logs.into_iter().map(|l| l.into()).collect(),
        total,
        page: query.page,
        page_size,
    }))
}

/// Get audit log detail by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "audit-logs",
    operation_id = "getApiAuditLogsById",
    params(
        ("id" = String, Path, description = "Audit log ID")
    ),
    responses(
        (status = 200, description = "Audit log found", body = AuditLogDetailResponse),
        (status = 404, description = "Audit log not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_audit_log(
    State(state): State<AuditLogsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<AuditLogDetailResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_read_audit_logs(&auth.0)?;

    let log = state.audit_log_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::not_found("AuditLog", &id))?;

    Ok(Json(log.into()))
}

/// List distinct entity types present in the audit trail
#[utoipa::path(
    get,
    path = "/entity-types",
    tag = "audit-logs",
    operation_id = "getApiAuditLogsEntityTypes",
    responses(
        (status = 200, description = "Distinct entity types", body = EntityTypesResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_entity_types(
    State(state): State<AuditLogsState>,
    auth: Authenticated,
) -> Result<Json<EntityTypesResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_read_audit_logs(&auth.0)?;

    let entity_types = state.audit_log_repo.find_distinct_entity_types().await?;
    Ok(Json(EntityTypesResponse { entity_types }))
}

/// Create audit logs router
pub fn audit_logs_router(state: AuditLogsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_audit_logs))
        .routes(routes!(list_entity_types))
        .routes(routes!(get_audit_log))
        .with_state(state)
}
