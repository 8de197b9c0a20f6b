//! Principal Entity
//!
//! A principal is a local user record. Authentication is delegated to the
//! hosted identity provider; the platform stores the IdP subject alongside
//! profile data and role assignments.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// User scope determines the default capabilities of a principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserScope {
    /// Platform administrator
    Admin,
    /// Content creator with own courses
    Instructor,
    /// Course consumer
    Student,
}

impl Default for UserScope {
    fn default() -> Self {
        Self::Student
    }
}

impl UserScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserScope::Admin => "ADMIN",
            UserScope::Instructor => "INSTRUCTOR",
            UserScope::Student => "STUDENT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Some(UserScope::Admin),
            "INSTRUCTOR" => Some(UserScope::Instructor),
            "STUDENT" => Some(UserScope::Student),
            _ => None,
        }
    }

    /// Default role code for this scope
    pub fn default_role(&self) -> &'static str {
        match self {
            UserScope::Admin => "lms:admin",
            UserScope::Instructor => "lms:instructor",
            UserScope::Student => "lms:student",
        }
    }
}

/// Principal entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Subject from the hosted identity provider (e.g. "auth0|abc123")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,

    /// Email address (unique)
    pub email: String,

    /// Display name
    pub display_name: String,

    /// Avatar URL from the IdP profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    /// User scope
    #[serde(default)]
    pub scope: UserScope,

    /// Assigned role codes
    #[serde(default)]
    pub roles: Vec<String>,

    /// Whether the principal may sign in
    #[serde(default = "default_active")]
    pub active: bool,

    /// When the principal last signed in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Principal {
    pub fn new(email: impl Into<String>, display_name: impl Into<String>, scope: UserScope) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            external_id: None,
            email: email.into(),
            display_name: display_name.into(),
            avatar_url: None,
            scope,
            roles: vec![scope.default_role().to_string()],
            active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    pub fn assign_role(&mut self, role_code: impl Into<String>) {
        let code = role_code.into();
        if !self.roles.contains(&code) {
            self.roles.push(code);
            self.updated_at = Utc::now();
        }
    }

    pub fn remove_role(&mut self, role_code: &str) {
        self.roles.retain(|r| r != role_code);
        self.updated_at = Utc::now();
    }

    pub fn has_role(&self, role_code: &str) -> bool {
        self.roles.iter().any(|r| r == role_code)
    }

    pub fn is_instructor(&self) -> bool {
        matches!(self.scope, UserScope::Instructor | UserScope::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.scope == UserScope::Admin
    }

    pub fn record_login(&mut self) {
        self.last_login_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    pub fn activate(&mut self) {
        self.active = true;
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }

    /// Change scope and swap the corresponding default role
    pub fn change_scope(&mut self, scope: UserScope) {
        let old_default = self.scope.default_role();
        self.roles.retain(|r| r != old_default);
        self.scope = scope;
        self.assign_role(scope.default_role());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_creation() {
        let principal = Principal::new("ada@example.com", "Ada Lovelace", UserScope::Student);
        assert_eq!(principal.scope, UserScope::Student);
        assert!(principal.active);
        assert!(principal.has_role("lms:student"));
    }

    #[test]
    fn test_role_assignment() {
        let mut principal = Principal::new("ada@example.com", "Ada", UserScope::Student);
        principal.assign_role("lms:instructor");
        assert!(principal.has_role("lms:instructor"));

        // Assigning twice does not duplicate
        principal.assign_role("lms:instructor");
        assert_eq!(principal.roles.iter().filter(|r| *r == "lms:instructor").count(), 1);

        principal.remove_role("lms:instructor");
        assert!(!principal.has_role("lms:instructor"));
    }

    #[test]
    fn test_change_scope_swaps_default_role() {
        let mut principal = Principal::new("ada@example.com", "Ada", UserScope::Student);
        principal.change_scope(UserScope::Instructor);

        assert_eq!(principal.scope, UserScope::Instructor);
        assert!(principal.has_role("lms:instructor"));
        assert!(!principal.has_role("lms:student"));
    }

    #[test]
    fn test_activation() {
        let mut principal = Principal::new("ada@example.com", "Ada", UserScope::Student);
        principal.deactivate();
        assert!(!principal.active);
        principal.activate();
        assert!(principal.active);
    }
}
