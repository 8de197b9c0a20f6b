//! Auth0 Adapter
//!
//! Handles authentication with the Auth0 hosted identity provider.
//! Auth0 delivers roles via a namespaced custom claim; this adapter also
//! accepts the plain `roles` claim for tenants using an Action that
//! writes it directly.

use crate::auth::oidc_service::IdTokenClaims;

use super::{display_name_from_claims, suggest_scope, IdpAdapter, IdpUserInfo};

/// Auth0 identity provider adapter
pub struct Auth0Adapter;

impl Auth0Adapter {
    pub fn new() -> Self {
        Self
    }

    /// Extract roles from claims.
    /// Prefers the `roles` claim, falls back to `groups`.
    fn extract_roles(&self, claims: &IdTokenClaims) -> Vec<String> {
        if let Some(ref roles) = claims.roles {
            return roles.clone();
        }
        if let Some(ref groups) = claims.groups {
            return groups.clone();
        }
        vec![]
    }
}

impl Default for Auth0Adapter {
    fn default() -> Self {
        Self::new()
    }
}

impl IdpAdapter for Auth0Adapter {
    fn provider_type(&self) -> &'static str {
        "auth0"
    }

    fn extract_user_info(&self, claims: &IdTokenClaims) -> IdpUserInfo {
        let roles = self.extract_roles(claims);
        let suggested_scope = suggest_scope(&roles);

        IdpUserInfo {
            external_id: claims.sub.clone(),
            email: claims.email.clone(),
            email_verified: claims.email_verified.unwrap_or(false),
            display_name: display_name_from_claims(claims),
            picture_url: claims.picture.clone(),
            roles,
            suggested_scope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserScope;
    use crate::auth::oidc_service::StringOrVec;

    fn claims_with_roles(roles: Option<Vec<String>>) -> IdTokenClaims {
        IdTokenClaims {
            iss: "https://tenant.auth0.com/".to_string(),
            sub: "auth0|abc123".to_string(),
            aud: StringOrVec::String("client-1".to_string()),
            exp: 2_000_000_000,
            iat: 1_000_000_000,
            nonce: None,
            email: Some("ada@example.com".to_string()),
            email_verified: Some(true),
            name: Some("Ada Lovelace".to_string()),
            given_name: None,
            family_name: None,
            picture: None,
            roles,
            groups: None,
        }
    }

    #[test]
    fn test_extract_user_info() {
        let adapter = Auth0Adapter::new();
        let claims = claims_with_roles(Some(vec!["instructor".to_string()]));

        let info = adapter.extract_user_info(&claims);
        assert_eq!(info.external_id, "auth0|abc123");
        assert_eq!(info.email.as_deref(), Some("ada@example.com"));
        assert!(info.email_verified);
        assert_eq!(info.suggested_scope, Some(UserScope::Instructor));
    }

    #[test]
    fn test_no_roles_no_scope() {
        let adapter = Auth0Adapter::new();
        let info = adapter.extract_user_info(&claims_with_roles(None));
        assert!(info.roles.is_empty());
        assert_eq!(info.suggested_scope, None);
    }
}
