//! SkillForge Configuration System
//!
//! This crate provides TOML-based configuration with environment variable override support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub mongodb: MongoConfig,
    pub auth: AuthConfig,
    pub oidc: OidcConfig,
    pub payments: PaymentsConfig,
    pub storage: StorageConfig,
    pub email: EmailConfig,

    /// Data directory for local storage (generated JWT keys, etc.)
    pub data_dir: String,

    /// Enable development mode (seeds demo data)
    pub dev_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            mongodb: MongoConfig::default(),
            auth: AuthConfig::default(),
            oidc: OidcConfig::default(),
            payments: PaymentsConfig::default(),
            storage: StorageConfig::default(),
            email: EmailConfig::default(),
            data_dir: "./data".to_string(),
            dev_mode: false,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            metrics_port: 9090,
            host: "0.0.0.0".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// MongoDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017/?replicaSet=rs0&directConnection=true".to_string(),
            database: "skillforge".to_string(),
        }
    }
}

/// Authentication configuration (session JWT issuance)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// External base URL for login redirects
    pub external_base: String,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            external_base: "http://localhost:3000".to_string(),
            jwt: JwtConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub issuer: String,
    pub private_key_path: String,
    pub public_key_path: String,
    pub session_token_expiry_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            issuer: "skillforge".to_string(),
            private_key_path: String::new(),
            public_key_path: String::new(),
            session_token_expiry_secs: 28800, // 8 hours
        }
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub secure: bool,
    pub same_site: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "sf_session".to_string(),
            secure: true,
            same_site: "Lax".to_string(),
        }
    }
}

/// Hosted identity provider (OIDC) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OidcConfig {
    /// Provider type: auth0, clerk, generic
    pub provider: String,
    /// Issuer URL, e.g. "https://tenant.auth0.com"
    pub issuer: String,
    pub client_id: String,
    pub client_secret: String,
    /// Callback path appended to auth.external_base
    pub redirect_path: String,
}

impl Default for OidcConfig {
    fn default() -> Self {
        Self {
            provider: "auth0".to_string(),
            issuer: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_path: "/auth/callback".to_string(),
        }
    }
}

/// Payment processor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentsConfig {
    /// Processor API base URL (overridable for tests)
    pub api_base: String,
    pub secret_key: String,
    /// Webhook signing secret for signature verification
    pub webhook_secret: String,
    /// URL the processor redirects to after successful checkout
    pub success_url: String,
    /// URL the processor redirects to after cancelled checkout
    pub cancel_url: String,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.stripe.com".to_string(),
            secret_key: String::new(),
            webhook_secret: String::new(),
            success_url: "http://localhost:3000/checkout/success".to_string(),
            cancel_url: "http://localhost:3000/checkout/cancel".to_string(),
        }
    }
}

/// Object storage configuration for the media library
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible stores (MinIO, localstack)
    pub endpoint: String,
    /// Pre-signed upload URL lifetime in seconds
    pub presign_expiry_secs: u64,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "skillforge-media".to_string(),
            region: "us-east-1".to_string(),
            endpoint: String::new(),
            presign_expiry_secs: 900, // 15 minutes
            max_upload_bytes: 4 * 1024 * 1024 * 1024,
        }
    }
}

/// SMTP email configuration for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: "no-reply@skillforge.dev".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        let loader = ConfigLoader::new();
        loader.load()
    }

    /// Validate settings that have no sensible fallback
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mongodb.uri.is_empty() {
            return Err(ConfigError::ValidationError("mongodb.uri must not be empty".into()));
        }
        if self.storage.presign_expiry_secs == 0 {
            return Err(ConfigError::ValidationError(
                "storage.presign_expiry_secs must be greater than zero".into(),
            ));
        }
        if !self.payments.secret_key.is_empty() && self.payments.webhook_secret.is_empty() {
            return Err(ConfigError::ValidationError(
                "payments.webhook_secret is required when payments are configured".into(),
            ));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# SkillForge Configuration
# Environment variables override these settings

[http]
port = 8080
metrics_port = 9090
host = "0.0.0.0"
cors_origins = ["http://localhost:3000"]

[mongodb]
uri = "mongodb://localhost:27017/?replicaSet=rs0&directConnection=true"
database = "skillforge"

[auth]
external_base = "http://localhost:3000"

[auth.jwt]
issuer = "skillforge"
private_key_path = ""
public_key_path = ""
session_token_expiry_secs = 28800

[auth.session]
cookie_name = "sf_session"
secure = true
same_site = "Lax"

[oidc]
provider = "auth0"  # auth0, clerk, generic
issuer = ""
client_id = ""
client_secret = ""
redirect_path = "/auth/callback"

[payments]
api_base = "https://api.stripe.com"
secret_key = ""
webhook_secret = ""
success_url = "http://localhost:3000/checkout/success"
cancel_url = "http://localhost:3000/checkout/cancel"

[storage]
bucket = "skillforge-media"
region = "us-east-1"
endpoint = ""
presign_expiry_secs = 900
max_upload_bytes = 4294967296

[email]
enabled = false
smtp_host = "localhost"
smtp_port = 587
smtp_username = ""
smtp_password = ""
from_address = "no-reply@skillforge.dev"

data_dir = "./data"
dev_mode = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.mongodb.database, "skillforge");
        assert!(!config.dev_mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_example_toml_parses() {
        let config: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();
        assert_eq!(config.auth.session.cookie_name, "sf_session");
        assert_eq!(config.storage.presign_expiry_secs, 900);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [http]
            port = 9999
            "#,
        )
        .unwrap();
        assert_eq!(config.http.port, 9999);
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.mongodb.database, "skillforge");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            dev_mode = true

            [mongodb]
            database = "skillforge_test"
            "#,
        )
        .unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert!(config.dev_mode);
        assert_eq!(config.mongodb.database, "skillforge_test");
    }

    #[test]
    fn test_validate_rejects_missing_webhook_secret() {
        let mut config = AppConfig::default();
        config.payments.secret_key = "sk_test_123".to_string();
        assert!(config.validate().is_err());
        config.payments.webhook_secret = "whsec_123".to_string();
        assert!(config.validate().is_ok());
    }
}
