//! Authentication Service
//!
//! Session JWT generation and validation.
//! Supports both RS256 (RSA) for production and HS256 (HMAC) for development.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation, Algorithm};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use crate::Principal;
use crate::shared::error::{PlatformError, Result};

/// JWT Claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (principal ID)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// JWT ID (unique identifier)
    pub jti: String,

    /// User scope (ADMIN, INSTRUCTOR, STUDENT)
    pub scope: String,

    /// User email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Display name
    pub name: String,

    /// Roles assigned to this principal
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Configuration for the auth service
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// RSA private key PEM content (for RS256)
    /// Takes precedence over secret_key if set
    pub rsa_private_key: Option<String>,

    /// RSA public key PEM content (for RS256)
    pub rsa_public_key: Option<String>,

    /// JWT secret key for HS256 (fallback for development)
    pub secret_key: String,

    /// Token issuer
    pub issuer: String,

    /// Token audience
    pub audience: String,

    /// Session token expiration in seconds
    pub session_token_expiry_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            rsa_private_key: None,
            rsa_public_key: None,
            secret_key: String::new(),
            issuer: "skillforge".to_string(),
            audience: "skillforge".to_string(),
            session_token_expiry_secs: 28800, // 8 hours (PT8H)
        }
    }
}

impl AuthConfig {
    /// Load RSA keys from file paths
    /// Falls back to env vars if files not found
    pub fn load_rsa_keys(
        private_key_path: Option<&str>,
        public_key_path: Option<&str>,
    ) -> (Option<String>, Option<String>) {
        let private_key = private_key_path
            .and_then(|p| Self::load_key_from_path_or_env(p, "SKILLFORGE_JWT_PRIVATE_KEY"));

        let public_key = public_key_path
            .and_then(|p| Self::load_key_from_path_or_env(p, "SKILLFORGE_JWT_PUBLIC_KEY"));

        (private_key, public_key)
    }

    /// Load key from file path, or from env var if path is empty/missing
    fn load_key_from_path_or_env(path: &str, env_var: &str) -> Option<String> {
        // Try file path first
        if !path.is_empty() {
            if let Ok(content) = fs::read_to_string(path) {
                info!("Loaded JWT key from file: {}", path);
                return Some(content);
            }
        }

        // Fall back to env var
        if let Ok(content) = std::env::var(env_var) {
            if !content.is_empty() {
                info!("Loaded JWT key from env: {}", env_var);
                return Some(content);
            }
        }

        None
    }

    /// Generate RSA key pair and optionally persist to directory
    /// Returns (private_key_pem, public_key_pem)
    pub fn generate_rsa_keys(persist_dir: Option<&Path>) -> Result<(String, String)> {
        use rsa::{RsaPrivateKey, RsaPublicKey, pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding}};

        info!("Generating RSA key pair (2048 bit)");

        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, 2048)
            .map_err(|e| PlatformError::Internal {
                message: format!("Failed to generate RSA key: {}", e)
            })?;
        let public_key = RsaPublicKey::from(&private_key);

        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| PlatformError::Internal {
                message: format!("Failed to encode private key: {}", e)
            })?
            .to_string();

        let public_pem = public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| PlatformError::Internal {
                message: format!("Failed to encode public key: {}", e)
            })?;

        // Persist if directory provided
        if let Some(dir) = persist_dir {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!("Could not create key directory: {}", e);
            } else {
                let private_path = dir.join("private.key");
                let public_path = dir.join("public.key");

                if let Err(e) = fs::write(&private_path, &private_pem) {
                    warn!("Could not persist private key: {}", e);
                } else if let Err(e) = fs::write(&public_path, &public_pem) {
                    warn!("Could not persist public key: {}", e);
                } else {
                    info!("Persisted RSA keys to {}", dir.display());
                }
            }
        }

        Ok((private_pem, public_pem))
    }

    /// Load or generate RSA keys.
    /// 1. Try loading from configured paths
    /// 2. Try loading from persisted .jwt-keys directory
    /// 3. Generate new keys and persist
    pub fn load_or_generate_rsa_keys(
        private_key_path: Option<&str>,
        public_key_path: Option<&str>,
    ) -> Result<(String, String)> {
        // 1. Try configured paths / env vars
        let (private, public) = Self::load_rsa_keys(private_key_path, public_key_path);
        if let (Some(priv_key), Some(pub_key)) = (private, public) {
            return Ok((priv_key, pub_key));
        }

        // 2. Try persisted keys
        let keys_dir = Path::new(".jwt-keys");
        let private_path = keys_dir.join("private.key");
        let public_path = keys_dir.join("public.key");

        if private_path.exists() && public_path.exists() {
            if let (Ok(priv_key), Ok(pub_key)) = (
                fs::read_to_string(&private_path),
                fs::read_to_string(&public_path),
            ) {
                info!("Loaded persisted RSA keys from .jwt-keys/");
                return Ok((priv_key, pub_key));
            }
        }

        // 3. Generate and persist
        Self::generate_rsa_keys(Some(keys_dir))
    }
}

/// Authentication service for token management
pub struct AuthService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl AuthService {
    /// Create auth service with RSA keys (RS256) - recommended for production
    pub fn new_with_rsa(config: AuthConfig, private_key_pem: &str, public_key_pem: &str) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| PlatformError::Internal {
                message: format!("Invalid RSA private key: {}", e)
            })?;

        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| PlatformError::Internal {
                message: format!("Invalid RSA public key: {}", e)
            })?;

        info!("AuthService initialized with RS256");

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
            algorithm: Algorithm::RS256,
        })
    }

    /// Create auth service with HMAC secret (HS256) - for development/simple setups
    pub fn new_with_secret(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());

        info!("AuthService initialized with HS256");

        Self {
            config,
            encoding_key,
            decoding_key,
            algorithm: Algorithm::HS256,
        }
    }

    /// Create auth service - uses RSA if keys provided, falls back to HMAC
    pub fn new(config: AuthConfig) -> Self {
        if let (Some(ref private_key), Some(ref public_key)) =
            (&config.rsa_private_key, &config.rsa_public_key)
        {
            match Self::new_with_rsa(config.clone(), private_key, public_key) {
                Ok(service) => return service,
                Err(e) => {
                    warn!("Failed to initialize RSA keys, falling back to HMAC: {}", e);
                }
            }
        }

        Self::new_with_secret(config)
    }

    /// Get the algorithm being used
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Session token lifetime in seconds
    pub fn session_expiry_secs(&self) -> i64 {
        self.config.session_token_expiry_secs
    }

    /// Generate a session token for a principal
    pub fn generate_session_token(&self, principal: &Principal) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.session_token_expiry_secs);

        let claims = AccessTokenClaims {
            sub: principal.id.clone(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: crate::TsidGenerator::generate(),
            scope: principal.scope.as_str().to_string(),
            email: Some(principal.email.clone()),
            name: principal.display_name.clone(),
            roles: principal.roles.clone(),
        };

        let header = Header::new(self.algorithm);
        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| PlatformError::Internal { message: format!("Failed to encode JWT: {}", e) })
    }

    /// Validate a session token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<AccessTokenClaims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => PlatformError::TokenExpired,
                _ => PlatformError::InvalidToken { message: format!("{}", e) },
            })
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Principal, UserScope};

    fn dev_service() -> AuthService {
        let config = AuthConfig {
            secret_key: "test-secret".to_string(),
            ..AuthConfig::default()
        };
        AuthService::new_with_secret(config)
    }

    #[test]
    fn test_generate_and_validate_token() {
        let service = dev_service();

        let principal = Principal::new("test@example.com", "Test User", UserScope::Instructor);
        let token = service.generate_session_token(&principal).unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, principal.id);
        assert_eq!(claims.scope, "INSTRUCTOR");
        assert!(claims.roles.contains(&"lms:instructor".to_string()));
    }

    #[test]
    fn test_invalid_token_rejected() {
        let service = dev_service();
        assert!(service.validate_token("not-a-jwt").is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), None);
        assert_eq!(extract_bearer_token("Basic abc123"), None);
    }
}
