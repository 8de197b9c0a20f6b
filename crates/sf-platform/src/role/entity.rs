//! Role and Permission Entities
//!
//! Authorization model for role-based access control.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use std::collections::HashSet;

/// Role source - where the role definition came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleSource {
    /// Defined in code (cannot be modified)
    Code,
    /// Defined in database (can be modified)
    Database,
    /// Synced from the external identity provider
    Idp,
}

impl Default for RoleSource {
    fn default() -> Self {
        Self::Database
    }
}

/// Role definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRole {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Role code, format: lms:{role_name} e.g., "lms:instructor"
    pub code: String,

    /// Human-readable display name
    pub display_name: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Permissions granted by this role
    #[serde(default)]
    pub permissions: HashSet<String>,

    /// Where the role came from
    #[serde(default)]
    pub source: RoleSource,

    /// Audit fields
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl AuthRole {
    pub fn new(role_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        let name = role_name.into();
        let now = Utc::now();

        Self {
            id: crate::TsidGenerator::generate(),
            code: format!("lms:{}", name),
            display_name: display_name.into(),
            description: None,
            permissions: HashSet::new(),
            source: RoleSource::Database,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for p in permissions {
            self.permissions.insert(p.into());
        }
        self
    }

    pub fn with_source(mut self, source: RoleSource) -> Self {
        self.source = source;
        self
    }

    pub fn grant_permission(&mut self, permission: impl Into<String>) {
        self.permissions.insert(permission.into());
        self.updated_at = Utc::now();
    }

    pub fn revoke_permission(&mut self, permission: &str) {
        self.permissions.remove(permission);
        self.updated_at = Utc::now();
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission) || self.has_wildcard_permission(permission)
    }

    /// Check for wildcard permissions
    /// Supports hierarchical wildcards for format: lms:{category}:{entity}:{action}
    /// Examples:
    ///   - "*:*" matches everything (superuser)
    ///   - "lms:*" matches all platform permissions
    ///   - "lms:catalog:*" matches all catalog permissions
    ///   - "lms:catalog:course:*" matches all course operations
    fn has_wildcard_permission(&self, permission: &str) -> bool {
        // Check for *:* (superuser)
        if self.permissions.contains("*:*") {
            return true;
        }

        let parts: Vec<&str> = permission.split(':').collect();
        if parts.is_empty() {
            return false;
        }

        // Build progressively longer wildcard patterns
        let mut prefix = String::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                prefix.push(':');
            }
            prefix.push_str(part);

            // Don't check wildcard for the full permission (last part)
            if i < parts.len() - 1 {
                let wildcard = format!("{}:*", prefix);
                if self.permissions.contains(&wildcard) {
                    return true;
                }
            }
        }

        false
    }

    pub fn can_modify(&self) -> bool {
        self.source == RoleSource::Database
    }

    /// Extract role name from code
    pub fn role_name(&self) -> &str {
        self.code.split(':').nth(1).unwrap_or(&self.code)
    }
}

/// Platform permissions - granular format: lms:{category}:{entity}:{action}
pub mod permissions {
    /// Superuser wildcard
    pub const ADMIN_ALL: &str = "*:*";

    /// Catalog permissions (courses, chapters, lessons, categories)
    pub mod catalog {
        pub const COURSE_VIEW: &str = "lms:catalog:course:view";
        pub const COURSE_CREATE: &str = "lms:catalog:course:create";
        pub const COURSE_UPDATE: &str = "lms:catalog:course:update";
        pub const COURSE_PUBLISH: &str = "lms:catalog:course:publish";
        pub const COURSE_DELETE: &str = "lms:catalog:course:delete";

        pub const CATEGORY_MANAGE: &str = "lms:catalog:category:manage";

        /// All catalog permissions
        pub const ALL: &[&str] = &[
            COURSE_VIEW, COURSE_CREATE, COURSE_UPDATE, COURSE_PUBLISH, COURSE_DELETE,
            CATEGORY_MANAGE,
        ];
    }

    /// Learning permissions (enrollments, progress)
    pub mod learning {
        pub const ENROLLMENT_VIEW: &str = "lms:learning:enrollment:view";
        pub const ENROLLMENT_CREATE: &str = "lms:learning:enrollment:create";
        pub const ENROLLMENT_GRANT: &str = "lms:learning:enrollment:grant";
        pub const ENROLLMENT_REVOKE: &str = "lms:learning:enrollment:revoke";

        pub const PROGRESS_VIEW: &str = "lms:learning:progress:view";
        pub const PROGRESS_RECORD: &str = "lms:learning:progress:record";

        /// All learning permissions
        pub const ALL: &[&str] = &[
            ENROLLMENT_VIEW, ENROLLMENT_CREATE, ENROLLMENT_GRANT, ENROLLMENT_REVOKE,
            PROGRESS_VIEW, PROGRESS_RECORD,
        ];
    }

    /// Messaging permissions (conversations between students and instructors)
    pub mod messaging {
        pub const CONVERSATION_VIEW: &str = "lms:messaging:conversation:view";
        pub const CONVERSATION_SEND: &str = "lms:messaging:conversation:send";

        /// All messaging permissions
        pub const ALL: &[&str] = &[CONVERSATION_VIEW, CONVERSATION_SEND];
    }

    /// Media library permissions
    pub mod media {
        pub const ASSET_VIEW: &str = "lms:media:asset:view";
        pub const ASSET_UPLOAD: &str = "lms:media:asset:upload";
        pub const ASSET_DELETE: &str = "lms:media:asset:delete";

        /// All media permissions
        pub const ALL: &[&str] = &[ASSET_VIEW, ASSET_UPLOAD, ASSET_DELETE];
    }

    /// Commerce permissions (checkout)
    pub mod commerce {
        pub const CHECKOUT_CREATE: &str = "lms:commerce:checkout:create";

        /// All commerce permissions
        pub const ALL: &[&str] = &[CHECKOUT_CREATE];
    }

    /// Insights permissions (analytics dashboards)
    pub mod insights {
        pub const ANALYTICS_VIEW: &str = "lms:insights:analytics:view";
        pub const ANALYTICS_ADMIN: &str = "lms:insights:analytics:admin";

        /// All insights permissions
        pub const ALL: &[&str] = &[ANALYTICS_VIEW, ANALYTICS_ADMIN];
    }

    /// IAM permissions
    pub mod iam {
        pub const USER_VIEW: &str = "lms:iam:user:view";
        pub const USER_UPDATE: &str = "lms:iam:user:update";
        pub const ROLE_VIEW: &str = "lms:iam:role:view";

        /// All IAM permissions
        pub const ALL: &[&str] = &[USER_VIEW, USER_UPDATE, ROLE_VIEW];
    }

    /// Audit permissions
    pub mod audit {
        pub const LOG_VIEW: &str = "lms:audit:log:view";

        /// All audit permissions
        pub const ALL: &[&str] = &[LOG_VIEW];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_code_format() {
        let role = AuthRole::new("instructor", "Instructor");
        assert_eq!(role.code, "lms:instructor");
        assert_eq!(role.role_name(), "instructor");
    }

    #[test]
    fn test_direct_permission() {
        let role = AuthRole::new("student", "Student")
            .with_permissions(["lms:learning:progress:record"]);
        assert!(role.has_permission("lms:learning:progress:record"));
        assert!(!role.has_permission("lms:catalog:course:create"));
    }

    #[test]
    fn test_wildcard_permission() {
        let role = AuthRole::new("instructor", "Instructor")
            .with_permissions(["lms:catalog:*"]);
        assert!(role.has_permission("lms:catalog:course:create"));
        assert!(role.has_permission("lms:catalog:category:manage"));
        assert!(!role.has_permission("lms:iam:user:view"));
    }

    #[test]
    fn test_superuser_permission() {
        let role = AuthRole::new("admin", "Admin").with_permissions(["*:*"]);
        assert!(role.has_permission("lms:catalog:course:delete"));
        assert!(role.has_permission("anything:at:all"));
    }

    #[test]
    fn test_code_roles_not_modifiable() {
        let role = AuthRole::new("admin", "Admin").with_source(RoleSource::Code);
        assert!(!role.can_modify());
    }
}
