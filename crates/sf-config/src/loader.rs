//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "application.toml",
    "skillforge.toml",
    "./config/config.toml",
    "./config/application.toml",
    "/etc/skillforge/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        // Start with defaults
        let mut config = AppConfig::default();

        // Try to load from file
        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        // Apply environment variable overrides
        self.apply_env_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(&self) -> Option<PathBuf> {
        // Check explicit path first
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        // Check SKILLFORGE_CONFIG env var
        if let Ok(path) = env::var("SKILLFORGE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // Search standard paths
        for path in CONFIG_PATHS {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, config: &mut AppConfig) {
        // HTTP
        if let Ok(val) = env::var("SKILLFORGE_HTTP_PORT") {
            if let Ok(port) = val.parse() {
                config.http.port = port;
            }
        }
        if let Ok(val) = env::var("SKILLFORGE_METRICS_PORT") {
            if let Ok(port) = val.parse() {
                config.http.metrics_port = port;
            }
        }
        if let Ok(val) = env::var("SKILLFORGE_HTTP_HOST") {
            config.http.host = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_CORS_ORIGINS") {
            config.http.cors_origins = val.split(',').map(|s| s.trim().to_string()).collect();
        }

        // MongoDB
        if let Ok(val) = env::var("SKILLFORGE_MONGODB_URI") {
            config.mongodb.uri = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_MONGODB_DATABASE") {
            config.mongodb.database = val;
        }

        // Auth
        if let Ok(val) = env::var("SKILLFORGE_AUTH_EXTERNAL_BASE") {
            config.auth.external_base = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_JWT_ISSUER") {
            config.auth.jwt.issuer = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_JWT_PRIVATE_KEY_PATH") {
            config.auth.jwt.private_key_path = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_JWT_PUBLIC_KEY_PATH") {
            config.auth.jwt.public_key_path = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_SESSION_COOKIE_NAME") {
            config.auth.session.cookie_name = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_SESSION_SECURE") {
            config.auth.session.secure = val.parse().unwrap_or(true);
        }

        // OIDC
        if let Ok(val) = env::var("SKILLFORGE_OIDC_PROVIDER") {
            config.oidc.provider = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_OIDC_ISSUER") {
            config.oidc.issuer = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_OIDC_CLIENT_ID") {
            config.oidc.client_id = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_OIDC_CLIENT_SECRET") {
            config.oidc.client_secret = val;
        }

        // Payments
        if let Ok(val) = env::var("SKILLFORGE_PAYMENTS_API_BASE") {
            config.payments.api_base = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_PAYMENTS_SECRET_KEY") {
            config.payments.secret_key = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_PAYMENTS_WEBHOOK_SECRET") {
            config.payments.webhook_secret = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_PAYMENTS_SUCCESS_URL") {
            config.payments.success_url = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_PAYMENTS_CANCEL_URL") {
            config.payments.cancel_url = val;
        }

        // Storage
        if let Ok(val) = env::var("SKILLFORGE_STORAGE_BUCKET") {
            config.storage.bucket = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_STORAGE_REGION") {
            config.storage.region = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_STORAGE_ENDPOINT") {
            config.storage.endpoint = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_STORAGE_PRESIGN_EXPIRY") {
            if let Ok(secs) = val.parse() {
                config.storage.presign_expiry_secs = secs;
            }
        }

        // Email
        if let Ok(val) = env::var("SKILLFORGE_EMAIL_ENABLED") {
            config.email.enabled = val.parse().unwrap_or(false);
        }
        if let Ok(val) = env::var("SKILLFORGE_SMTP_HOST") {
            config.email.smtp_host = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_SMTP_PORT") {
            if let Ok(port) = val.parse() {
                config.email.smtp_port = port;
            }
        }
        if let Ok(val) = env::var("SKILLFORGE_SMTP_USERNAME") {
            config.email.smtp_username = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_SMTP_PASSWORD") {
            config.email.smtp_password = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_EMAIL_FROM") {
            config.email.from_address = val;
        }

        // General
        if let Ok(val) = env::var("SKILLFORGE_DATA_DIR") {
            config.data_dir = val;
        }
        if let Ok(val) = env::var("SKILLFORGE_DEV_MODE") {
            config.dev_mode = val.parse().unwrap_or(false);
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
