//! Auth API
//!
//! Login flow against the hosted identity provider plus session endpoints.
//!
//! Flow:
//! 1. `GET /auth/login` stores an `OidcLoginState` and redirects the browser
//!    to the IdP authorization endpoint.
//! 2. `GET /auth/callback` consumes the state, exchanges the code, validates
//!    the ID token, upserts the local principal, and sets the session cookie.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::auth::login_state::OidcLoginState;
use crate::auth::login_state_repository::OidcLoginStateRepository;
use crate::auth::oidc_service::OidcService;
use crate::idp::IdpAdapter;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::{AuditService, AuthService, Principal, PrincipalRepository, UserScope};

/// Session cookie settings
#[derive(Clone)]
pub struct SessionCookieSettings {
    pub name: String,
    pub secure: bool,
    pub same_site: String,
    pub max_age_secs: i64,
}

impl Default for SessionCookieSettings {
    fn default() -> Self {
        Self {
            name: "sf_session".to_string(),
            secure: true,
            same_site: "Lax".to_string(),
            max_age_secs: 28800,
        }
    }
}

/// Auth API state
#[derive(Clone)]
pub struct AuthApiState {
    pub oidc_service: Arc<OidcService>,
    pub login_state_repo: Arc<OidcLoginStateRepository>,
    pub principal_repo: Arc<PrincipalRepository>,
    pub auth_service: Arc<AuthService>,
    pub audit_service: Arc<AuditService>,
    pub idp_adapter: Arc<dyn IdpAdapter>,
    pub provider_id: String,
    pub cookie: SessionCookieSettings,
    /// Front-end base URL for post-login redirects
    pub external_base: String,
}

/// Query parameters for login
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginQuery {
    /// Relative path to return to after login
    pub return_to: Option<String>,
}

/// Query parameters for the OIDC callback
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Current session response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub principal_id: String,
    pub email: Option<String>,
    pub name: String,
    pub scope: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

/// Start the OIDC login flow
pub async fn login(
    State(state): State<AuthApiState>,
    Query(query): Query<LoginQuery>,
) -> Result<Redirect, PlatformError> {
    // Only allow relative return paths to avoid open redirects
    let return_to = query.return_to.filter(|p| p.starts_with('/'));

    let login_state = OidcLoginState::new(return_to);
    state.login_state_repo.insert(&login_state).await?;

    let url = state
        .oidc_service
        .get_authorization_url(&state.provider_id, &login_state.state, Some(&login_state.nonce))
        .await?;

    Ok(Redirect::temporary(&url))
}

/// Handle the OIDC callback
pub async fn callback(
    State(state): State<AuthApiState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, PlatformError> {
    if let Some(error) = query.error {
        warn!(error = %error, description = ?query.error_description, "IdP returned error");
        return Err(PlatformError::unauthorized(format!("Login failed: {}", error)));
    }

    let code = query.code
        .ok_or_else(|| PlatformError::validation("Missing authorization code"))?;
    let state_param = query.state
        .ok_or_else(|| PlatformError::validation("Missing state parameter"))?;

    // Consume the login state (single use)
    let login_state = state.login_state_repo.take(&state_param).await?
        .ok_or_else(|| PlatformError::unauthorized("Unknown or already-used login state"))?;

    if login_state.is_expired() {
        return Err(PlatformError::unauthorized("Login state expired"));
    }

    // Exchange code and validate the ID token
    let tokens = state.oidc_service.exchange_code(&state.provider_id, &code).await?;
    let id_token = tokens.id_token
        .ok_or_else(|| PlatformError::unauthorized("IdP response missing ID token"))?;

    let claims = state
        .oidc_service
        .validate_id_token(&state.provider_id, &id_token, Some(&login_state.nonce))
        .await?;

    let user_info = state.idp_adapter.extract_user_info(&claims);

    // Upsert the local principal
    let mut principal = match state.principal_repo.find_by_external_id(&user_info.external_id).await? {
        Some(p) => p,
        None => {
            // Fall back to email match for principals created before IdP linking
            let by_email = match user_info.email {
                Some(ref email) => state.principal_repo.find_by_email(email).await?,
                None => None,
            };

            match by_email {
                Some(mut p) => {
                    p.external_id = Some(user_info.external_id.clone());
                    p
                }
                None => {
                    let email = user_info.email.clone()
                        .ok_or_else(|| PlatformError::unauthorized("IdP did not provide an email"))?;
                    let display_name = user_info.display_name.clone().unwrap_or_else(|| email.clone());
                    let scope = user_info.suggested_scope.unwrap_or(UserScope::Student);

                    let new_principal = Principal::new(email, display_name, scope)
                        .with_external_id(user_info.external_id.clone());
                    state.principal_repo.insert(&new_principal).await?;
                    info!(principal_id = %new_principal.id, "Provisioned principal from IdP login");
                    new_principal
                }
            }
        }
    };

    if !principal.active {
        state.audit_service.log_login(&principal.id, false).await?;
        return Err(PlatformError::forbidden("Account is deactivated"));
    }

    // Refresh profile fields from the IdP
    if let Some(name) = user_info.display_name {
        principal.display_name = name;
    }
    if let Some(url) = user_info.picture_url {
        principal.avatar_url = Some(url);
    }
    principal.record_login();
    state.principal_repo.update(&principal).await?;

    state.audit_service.log_login(&principal.id, true).await?;

    // Issue session and redirect back to the front-end
    let token = state.auth_service.generate_session_token(&principal)?;
    let destination = login_state.return_to
        .map(|p| format!("{}{}", state.external_base, p))
        .unwrap_or_else(|| state.external_base.clone());

    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        session_cookie(&state.cookie, &token)
            .parse()
            .map_err(|_| PlatformError::internal("Invalid cookie header"))?,
    );

    Ok((headers, Redirect::temporary(&destination)).into_response())
}

/// Get the current session
pub async fn me(auth: Authenticated) -> Json<MeResponse> {
    let mut permissions: Vec<String> = auth.0.permissions.iter().cloned().collect();
    permissions.sort();

    Json(MeResponse {
        principal_id: auth.0.principal_id.clone(),
        email: auth.0.email.clone(),
        name: auth.0.name.clone(),
        scope: auth.0.scope.clone(),
        roles: auth.0.roles.clone(),
        permissions,
    })
}

/// Log out: clear the session cookie
pub async fn logout(
    State(state): State<AuthApiState>,
    auth: Authenticated,
) -> Result<Response, PlatformError> {
    state.audit_service.log_logout(&auth.0).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        expired_cookie(&state.cookie)
            .parse()
            .map_err(|_| PlatformError::internal("Invalid cookie header"))?,
    );

    Ok((headers, Json(serde_json::json!({ "success": true }))).into_response())
}

fn session_cookie(settings: &SessionCookieSettings, token: &str) -> String {
    let secure = if settings.secure { "; Secure" } else { "" };
    format!(
        "{}={}; Path=/; HttpOnly; SameSite={}; Max-Age={}{}",
        settings.name, token, settings.same_site, settings.max_age_secs, secure
    )
}

fn expired_cookie(settings: &SessionCookieSettings) -> String {
    let secure = if settings.secure { "; Secure" } else { "" };
    format!(
        "{}=; Path=/; HttpOnly; SameSite={}; Max-Age=0{}",
        settings.name, settings.same_site, secure
    )
}

/// Create the auth router
pub fn auth_router(state: AuthApiState) -> Router {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/me", get(me))
        .route("/logout", post(logout))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_format() {
        let settings = SessionCookieSettings::default();
        let cookie = session_cookie(&settings, "tok123");
        assert!(cookie.starts_with("sf_session=tok123; "));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Secure"));
    }

    #[test]
    fn test_expired_cookie_clears_value() {
        let settings = SessionCookieSettings::default();
        let cookie = expired_cookie(&settings);
        assert!(cookie.starts_with("sf_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}
