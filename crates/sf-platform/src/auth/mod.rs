//! Authentication
//!
//! Session JWT issuance and OIDC login against the hosted identity provider.

pub mod auth_service;
pub mod oidc_service;
pub mod login_state;
pub mod login_state_repository;
pub mod auth_api;

pub use auth_service::{AuthService, AuthConfig, AccessTokenClaims};
pub use oidc_service::OidcService;
pub use login_state::OidcLoginState;
pub use login_state_repository::OidcLoginStateRepository;
