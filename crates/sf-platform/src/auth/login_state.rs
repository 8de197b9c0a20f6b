//! OIDC Login State
//!
//! Short-lived state records for in-flight OIDC logins (CSRF protection
//! and nonce binding).

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// In-flight OIDC login state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OidcLoginState {
    /// The opaque `state` parameter sent to the IdP
    #[serde(rename = "_id")]
    pub state: String,

    /// Nonce bound into the ID token
    pub nonce: String,

    /// Where to send the browser after login completes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_to: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,
}

impl OidcLoginState {
    /// Login states are valid for ten minutes
    const TTL_MINUTES: i64 = 10;

    pub fn new(return_to: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            state: crate::TsidGenerator::generate(),
            nonce: crate::TsidGenerator::generate(),
            return_to,
            created_at: now,
            expires_at: now + Duration::minutes(Self::TTL_MINUTES),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_not_expired() {
        let state = OidcLoginState::new(None);
        assert!(!state.is_expired());
        assert_ne!(state.state, state.nonce);
    }
}
