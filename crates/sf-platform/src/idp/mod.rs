//! Identity Provider Adapters
//!
//! Specialized adapters for hosted OIDC identity providers.
//! Each adapter handles provider-specific claim mapping and role extraction.

pub mod auth0;
pub mod clerk;

use crate::UserScope;
use crate::auth::oidc_service::IdTokenClaims;

pub use auth0::Auth0Adapter;
pub use clerk::ClerkAdapter;

/// Extracted user information from an IdP token
#[derive(Debug, Clone)]
pub struct IdpUserInfo {
    /// External subject ID from the IdP
    pub external_id: String,
    /// Email address
    pub email: Option<String>,
    /// Email verified
    pub email_verified: bool,
    /// Display name
    pub display_name: Option<String>,
    /// Picture URL
    pub picture_url: Option<String>,
    /// Raw roles from the IdP
    pub roles: Vec<String>,
    /// Suggested user scope derived from IdP roles
    pub suggested_scope: Option<UserScope>,
}

/// Trait for IdP-specific adapters
pub trait IdpAdapter: Send + Sync {
    /// Get the provider type identifier
    fn provider_type(&self) -> &'static str;

    /// Extract user information from ID token claims
    fn extract_user_info(&self, claims: &IdTokenClaims) -> IdpUserInfo;

    /// Get additional scopes required by this provider
    fn required_scopes(&self) -> Vec<String> {
        vec!["openid".to_string(), "profile".to_string(), "email".to_string()]
    }
}

/// Map raw IdP role names to a platform scope.
///
/// Recognized role names (case-insensitive): "admin", "instructor",
/// "teacher", "student". The highest-privilege match wins.
pub fn suggest_scope(roles: &[String]) -> Option<UserScope> {
    let mut suggested = None;
    for role in roles {
        match role.to_ascii_lowercase().as_str() {
            "admin" | "lms:admin" => return Some(UserScope::Admin),
            "instructor" | "teacher" | "lms:instructor" => {
                suggested = Some(UserScope::Instructor);
            }
            "student" | "lms:student" => {
                if suggested.is_none() {
                    suggested = Some(UserScope::Student);
                }
            }
            _ => {}
        }
    }
    suggested
}

/// Build an adapter by provider name from config
pub fn adapter_for(provider: &str) -> Box<dyn IdpAdapter> {
    match provider.to_ascii_lowercase().as_str() {
        "clerk" => Box::new(ClerkAdapter::new()),
        _ => Box::new(Auth0Adapter::new()),
    }
}

/// Assemble a display name from OIDC name claims
pub(crate) fn display_name_from_claims(claims: &IdTokenClaims) -> Option<String> {
    if let Some(ref name) = claims.name {
        return Some(name.clone());
    }
    match (&claims.given_name, &claims.family_name) {
        (Some(given), Some(family)) => Some(format!("{} {}", given, family)),
        (Some(given), None) => Some(given.clone()),
        (None, Some(family)) => Some(family.clone()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_scope_admin_wins() {
        let roles = vec!["student".to_string(), "admin".to_string()];
        assert_eq!(suggest_scope(&roles), Some(UserScope::Admin));
    }

    #[test]
    fn test_suggest_scope_instructor_over_student() {
        let roles = vec!["student".to_string(), "teacher".to_string()];
        assert_eq!(suggest_scope(&roles), Some(UserScope::Instructor));
    }

    #[test]
    fn test_suggest_scope_unknown_roles() {
        let roles = vec!["billing".to_string()];
        assert_eq!(suggest_scope(&roles), None);
    }
}
