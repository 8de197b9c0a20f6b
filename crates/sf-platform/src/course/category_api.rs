//! Categories API
//!
//! Category listing is public; mutation requires the manage permission.

use axum::{
    extract::{State, Path},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::course::category::Category;
use crate::{AuditService, CategoryRepository, CourseRepository};
use crate::shared::api_common::{CreatedResponse, SuccessResponse};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;

/// Category response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
        }
    }
}

/// Category list response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryResponse>,
}

/// Create category request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// Categories service state
#[derive(Clone)]
pub struct CategoriesState {
    pub category_repo: Arc<CategoryRepository>,
    pub course_repo: Arc<CourseRepository>,
    pub audit_service: Arc<AuditService>,
}

/// List categories
#[utoipa::path(
    get,
    path = "",
    tag = "categories",
    operation_id = "getApiCategories",
    responses(
        (status = 200, description = "List of categories", body = CategoryListResponse)
    )
)]
pub async fn list_categories(
    State(state): State<CategoriesState>,
) -> Result<Json<CategoryListResponse>, PlatformError> {
    let categories = state.category_repo.find_all().await?;
    Ok(Json(CategoryListResponse {
        categories: categories.into_iter().map(|c| c.into()).collect(),
    }))
}

/// Create a category
#[utoipa::path(
    post,
    path = "",
    tag = "categories",
    operation_id = "postApiCategories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CreatedResponse),
        (status = 409, description = "Duplicate name")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_category(
    State(state): State<CategoriesState>,
    auth: Authenticated,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<Json<CreatedResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_manage_categories(&auth.0)?;

    let name = req.name.trim();
    if name.is_empty() {
        return Err(PlatformError::validation("Category name is required"));
    }

    let category = Category::new(name);
    if state.category_repo.find_by_slug(&category.slug).await?.is_some() {
        return Err(PlatformError::duplicate("Category", "name", name));
    }

    let id = category.id.clone();
    state.category_repo.insert(&category).await?;
    state.audit_service.log_create(&auth.0, "Category", &id, "CreateCategoryCommand").await?;

    Ok(Json(CreatedResponse::new(id)))
}

/// Delete a category
///
/// Categories referenced by courses cannot be deleted.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "categories",
    operation_id = "deleteApiCategoriesById",
    params(
        ("id" = String, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted", body = SuccessResponse),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_category(
    State(state): State<CategoriesState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_manage_categories(&auth.0)?;

    if state.category_repo.find_by_id(&id).await?.is_none() {
        return Err(PlatformError::not_found("Category", &id));
    }

    let in_use = state.course_repo.find_by_category(&id).await?;
    if !in_use.is_empty() {
        return Err(PlatformError::duplicate("Category", "courses", format!("{} courses", in_use.len())));
    }

    state.category_repo.delete(&id).await?;
    state.audit_service.log_delete(&auth.0, "Category", &id, "DeleteCategoryCommand").await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Create categories router
pub fn categories_router(state: CategoriesState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_categories, create_category))
        .routes(routes!(delete_category))
        .with_state(state)
}
