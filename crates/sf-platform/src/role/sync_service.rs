//! Role Sync Service
//!
//! Synchronizes code-defined platform roles to the database at startup.
//! Code-defined roles are the source of truth for their permission sets:
//! a changed permission list in code overwrites the stored role.

use tracing::{info, warn};

use crate::role::entity::{permissions, AuthRole, RoleSource};
use crate::RoleRepository;
use crate::shared::error::Result;

/// Code-defined role definition
pub struct RoleDefinition {
    pub role_name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub permissions: &'static [&'static str],
}

impl RoleDefinition {
    pub fn full_code(&self) -> String {
        format!("lms:{}", self.role_name)
    }
}

/// Admin - full access to everything
pub const LMS_ADMIN: RoleDefinition = RoleDefinition {
    role_name: "admin",
    display_name: "Administrator",
    description: "Full access to all platform features and administration",
    permissions: &[permissions::ADMIN_ALL],
};

/// Instructor - authors courses and views their analytics
pub const LMS_INSTRUCTOR: RoleDefinition = RoleDefinition {
    role_name: "instructor",
    display_name: "Instructor",
    description: "Author courses, manage enrollments, and view analytics",
    permissions: &[
        permissions::catalog::COURSE_VIEW,
        permissions::catalog::COURSE_CREATE,
        permissions::catalog::COURSE_UPDATE,
        permissions::catalog::COURSE_PUBLISH,
        permissions::catalog::COURSE_DELETE,
        permissions::learning::ENROLLMENT_VIEW,
        permissions::learning::ENROLLMENT_GRANT,
        permissions::learning::ENROLLMENT_REVOKE,
        permissions::learning::PROGRESS_VIEW,
        permissions::messaging::CONVERSATION_VIEW,
        permissions::messaging::CONVERSATION_SEND,
        permissions::media::ASSET_VIEW,
        permissions::media::ASSET_UPLOAD,
        permissions::media::ASSET_DELETE,
        permissions::insights::ANALYTICS_VIEW,
    ],
};

/// Student - consumes published courses
pub const LMS_STUDENT: RoleDefinition = RoleDefinition {
    role_name: "student",
    display_name: "Student",
    description: "Enroll in courses, track progress, and message instructors",
    permissions: &[
        permissions::catalog::COURSE_VIEW,
        permissions::learning::ENROLLMENT_VIEW,
        permissions::learning::ENROLLMENT_CREATE,
        permissions::learning::PROGRESS_VIEW,
        permissions::learning::PROGRESS_RECORD,
        permissions::messaging::CONVERSATION_VIEW,
        permissions::messaging::CONVERSATION_SEND,
        permissions::commerce::CHECKOUT_CREATE,
    ],
};

/// All code-defined roles
pub const CODE_DEFINED_ROLES: &[&RoleDefinition] = &[&LMS_ADMIN, &LMS_INSTRUCTOR, &LMS_STUDENT];

/// Synchronizes code-defined roles into the roles collection
pub struct RoleSyncService {
    role_repo: RoleRepository,
}

impl RoleSyncService {
    pub fn new(role_repo: RoleRepository) -> Self {
        Self { role_repo }
    }

    /// Sync all code-defined roles to the database.
    ///
    /// Creates missing roles and overwrites the permission set of
    /// existing code-sourced roles. Database-sourced roles with the
    /// same code are left untouched and a warning is logged.
    pub async fn sync_code_defined_roles(&self) -> Result<()> {
        for definition in CODE_DEFINED_ROLES {
            self.sync_role(definition).await?;
        }
        info!(count = CODE_DEFINED_ROLES.len(), "Code-defined roles synced");
        Ok(())
    }

    async fn sync_role(&self, definition: &RoleDefinition) -> Result<()> {
        let code = definition.full_code();

        match self.role_repo.find_by_code(&code).await? {
            Some(mut existing) => {
                if existing.source != RoleSource::Code {
                    warn!(code = %code, "Role exists with non-code source, skipping sync");
                    return Ok(());
                }

                existing.display_name = definition.display_name.to_string();
                existing.description = Some(definition.description.to_string());
                existing.permissions = definition.permissions.iter().map(|p| p.to_string()).collect();
                existing.updated_at = chrono::Utc::now();
                self.role_repo.update(&existing).await?;
            }
            None => {
                let role = AuthRole::new(definition.role_name, definition.display_name)
                    .with_description(definition.description)
                    .with_permissions(definition.permissions.iter().copied())
                    .with_source(RoleSource::Code);
                self.role_repo.insert(&role).await?;
                info!(code = %code, "Created code-defined role");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_definitions_have_unique_codes() {
        let mut codes = std::collections::HashSet::new();
        for def in CODE_DEFINED_ROLES {
            assert!(codes.insert(def.full_code()), "Duplicate role code");
        }
    }

    #[test]
    fn test_student_cannot_author_courses() {
        assert!(!LMS_STUDENT.permissions.contains(&permissions::catalog::COURSE_CREATE));
        assert!(LMS_STUDENT.permissions.contains(&permissions::learning::PROGRESS_RECORD));
    }

    #[test]
    fn test_instructor_can_publish() {
        assert!(LMS_INSTRUCTOR.permissions.contains(&permissions::catalog::COURSE_PUBLISH));
    }
}
