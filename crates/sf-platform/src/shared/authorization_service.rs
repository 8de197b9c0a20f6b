//! Authorization Service
//!
//! Permission-based access control with role resolution.

use std::collections::HashSet;
use std::sync::Arc;
use crate::role::entity::permissions;
use crate::RoleRepository;
use crate::shared::error::{PlatformError, Result};
use crate::AccessTokenClaims;

/// Authorization context for a request
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Principal ID
    pub principal_id: String,

    /// User scope (ADMIN, INSTRUCTOR, STUDENT)
    pub scope: String,

    /// Email
    pub email: Option<String>,

    /// Display name
    pub name: String,

    /// All permissions (resolved from roles)
    pub permissions: HashSet<String>,

    /// Role codes
    pub roles: Vec<String>,
}

impl AuthContext {
    /// Create from JWT claims with resolved permissions
    pub fn from_claims_with_permissions(
        claims: &AccessTokenClaims,
        permissions: HashSet<String>,
    ) -> Self {
        Self {
            principal_id: claims.sub.clone(),
            scope: claims.scope.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
            permissions,
            roles: claims.roles.clone(),
        }
    }

    /// Check if this context is for a platform admin
    pub fn is_admin(&self) -> bool {
        self.scope == "ADMIN"
    }

    /// Check if this context is for an instructor (admins count)
    pub fn is_instructor(&self) -> bool {
        self.scope == "INSTRUCTOR" || self.is_admin()
    }

    /// Check if this context has a specific permission
    pub fn has_permission(&self, permission: &str) -> bool {
        // Direct match
        if self.permissions.contains(permission) {
            return true;
        }

        // Superuser *:*
        if self.permissions.contains(permissions::ADMIN_ALL) {
            return true;
        }

        // Hierarchical wildcard matching: lms:catalog:course:view matches
        // lms:*, lms:catalog:*, lms:catalog:course:*
        let parts: Vec<&str> = permission.split(':').collect();
        let mut prefix = String::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                prefix.push(':');
            }
            prefix.push_str(part);

            if i < parts.len() - 1 {
                let wildcard = format!("{}:*", prefix);
                if self.permissions.contains(&wildcard) {
                    return true;
                }
            }
        }

        false
    }

    /// Check if this context has all specified permissions
    pub fn has_all_permissions(&self, required: &[&str]) -> bool {
        required.iter().all(|p| self.has_permission(p))
    }

    /// Check if this context has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(&role.to_string())
    }
}

/// Authorization service for checking permissions
pub struct AuthorizationService {
    role_repo: Arc<RoleRepository>,
}

impl AuthorizationService {
    pub fn new(role_repo: Arc<RoleRepository>) -> Self {
        Self { role_repo }
    }

    /// Build an authorization context from JWT claims.
    /// Resolves all permissions from roles.
    pub async fn build_context(&self, claims: &AccessTokenClaims) -> Result<AuthContext> {
        let permissions = self.resolve_permissions(&claims.roles).await?;
        Ok(AuthContext::from_claims_with_permissions(claims, permissions))
    }

    /// Resolve all permissions for a set of role codes
    async fn resolve_permissions(&self, role_codes: &[String]) -> Result<HashSet<String>> {
        if role_codes.is_empty() {
            return Ok(HashSet::new());
        }

        let roles = self.role_repo.find_by_codes(role_codes).await?;
        let mut permissions = HashSet::new();

        for role in roles {
            permissions.extend(role.permissions);
        }

        Ok(permissions)
    }

    /// Require specific permission
    pub fn require_permission(&self, context: &AuthContext, permission: &str) -> Result<()> {
        if !context.has_permission(permission) {
            return Err(PlatformError::forbidden(format!(
                "Permission required: {}",
                permission
            )));
        }
        Ok(())
    }

    /// Require admin scope
    pub fn require_admin(&self, context: &AuthContext) -> Result<()> {
        if !context.is_admin() {
            return Err(PlatformError::forbidden("Admin scope required"));
        }
        Ok(())
    }
}

/// Permission check helpers used by API handlers.
///
/// Each helper maps to one permission string so handlers stay readable.
pub mod checks {
    use super::AuthContext;
    use crate::role::entity::permissions::*;
    use crate::shared::error::{PlatformError, Result};

    fn require(ctx: &AuthContext, permission: &str) -> Result<()> {
        if ctx.has_permission(permission) {
            Ok(())
        } else {
            Err(PlatformError::forbidden(format!("Missing permission: {}", permission)))
        }
    }

    // Catalog
    pub fn can_read_courses(ctx: &AuthContext) -> Result<()> {
        require(ctx, catalog::COURSE_VIEW)
    }

    pub fn can_author_courses(ctx: &AuthContext) -> Result<()> {
        require(ctx, catalog::COURSE_CREATE)
    }

    pub fn can_update_courses(ctx: &AuthContext) -> Result<()> {
        require(ctx, catalog::COURSE_UPDATE)
    }

    pub fn can_publish_courses(ctx: &AuthContext) -> Result<()> {
        require(ctx, catalog::COURSE_PUBLISH)
    }

    pub fn can_delete_courses(ctx: &AuthContext) -> Result<()> {
        require(ctx, catalog::COURSE_DELETE)
    }

    pub fn can_manage_categories(ctx: &AuthContext) -> Result<()> {
        require(ctx, catalog::CATEGORY_MANAGE)
    }

    // Learning
    pub fn can_read_enrollments(ctx: &AuthContext) -> Result<()> {
        require(ctx, learning::ENROLLMENT_VIEW)
    }

    pub fn can_enroll(ctx: &AuthContext) -> Result<()> {
        require(ctx, learning::ENROLLMENT_CREATE)
    }

    pub fn can_grant_enrollments(ctx: &AuthContext) -> Result<()> {
        require(ctx, learning::ENROLLMENT_GRANT)
    }

    pub fn can_revoke_enrollments(ctx: &AuthContext) -> Result<()> {
        require(ctx, learning::ENROLLMENT_REVOKE)
    }

    pub fn can_read_progress(ctx: &AuthContext) -> Result<()> {
        require(ctx, learning::PROGRESS_VIEW)
    }

    pub fn can_record_progress(ctx: &AuthContext) -> Result<()> {
        require(ctx, learning::PROGRESS_RECORD)
    }

    // Messaging
    pub fn can_read_conversations(ctx: &AuthContext) -> Result<()> {
        require(ctx, messaging::CONVERSATION_VIEW)
    }

    pub fn can_send_messages(ctx: &AuthContext) -> Result<()> {
        require(ctx, messaging::CONVERSATION_SEND)
    }

    // Media
    pub fn can_read_media(ctx: &AuthContext) -> Result<()> {
        require(ctx, media::ASSET_VIEW)
    }

    pub fn can_upload_media(ctx: &AuthContext) -> Result<()> {
        require(ctx, media::ASSET_UPLOAD)
    }

    pub fn can_delete_media(ctx: &AuthContext) -> Result<()> {
        require(ctx, media::ASSET_DELETE)
    }

    // Commerce
    pub fn can_create_checkout(ctx: &AuthContext) -> Result<()> {
        require(ctx, commerce::CHECKOUT_CREATE)
    }

    // Insights
    pub fn can_view_analytics(ctx: &AuthContext) -> Result<()> {
        require(ctx, insights::ANALYTICS_VIEW)
    }

    pub fn can_view_admin_analytics(ctx: &AuthContext) -> Result<()> {
        require(ctx, insights::ANALYTICS_ADMIN)
    }

    // IAM
    pub fn can_read_users(ctx: &AuthContext) -> Result<()> {
        require(ctx, iam::USER_VIEW)
    }

    pub fn can_write_users(ctx: &AuthContext) -> Result<()> {
        require(ctx, iam::USER_UPDATE)
    }

    pub fn can_read_roles(ctx: &AuthContext) -> Result<()> {
        require(ctx, iam::ROLE_VIEW)
    }

    // Audit
    pub fn can_read_audit_logs(ctx: &AuthContext) -> Result<()> {
        require(ctx, audit::LOG_VIEW)
    }
}
