//! Clerk Adapter
//!
//! Handles authentication with the Clerk hosted identity provider.
//! Clerk exposes organization roles through the `groups` claim on its
//! OIDC-compatible tokens.

use crate::auth::oidc_service::IdTokenClaims;

use super::{display_name_from_claims, suggest_scope, IdpAdapter, IdpUserInfo};

/// Clerk identity provider adapter
pub struct ClerkAdapter;

impl ClerkAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Clerk encodes org roles as "org:role" entries in the groups claim
    fn extract_roles(&self, claims: &IdTokenClaims) -> Vec<String> {
        let raw = claims.groups.clone().or_else(|| claims.roles.clone()).unwrap_or_default();

        raw.into_iter()
            .map(|entry| {
                match entry.rsplit_once(':') {
                    Some((_, role)) => role.to_string(),
                    None => entry,
                }
            })
            .collect()
    }
}

impl Default for ClerkAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl IdpAdapter for ClerkAdapter {
    fn provider_type(&self) -> &'static str {
        "clerk"
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

    #[test]
    fn test_org_role_extraction() {
        let adapter = ClerkAdapter::new();
        let claims = IdTokenClaims {
            iss: "https://clerk.example.com".to_string(),
            sub: "user_2abc".to_string(),
            aud: StringOrVec::String("client-1".to_string()),
            exp: 2_000_000_000,
            iat: 1_000_000_000,
            nonce: None,
            email: Some("grace@example.com".to_string()),
            email_verified: Some(true),
            name: None,
            given_name: Some("Grace".to_string()),
            family_name: Some("Hopper".to_string()),
            picture: None,
            roles: None,
            groups: Some(vec!["acme:instructor".to_string()]),
        };

        let info = adapter.extract_user_info(&claims);
        assert_eq!(info.roles, vec!["instructor".to_string()]);
        assert_eq!(info.suggested_scope, Some(UserScope::Instructor));
        assert_eq!(info.display_name.as_deref(), Some("Grace Hopper"));
    }
}
