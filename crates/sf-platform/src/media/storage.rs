//! Object Storage Service
//!
//! Pre-signed direct-to-storage uploads backed by S3 (or any
//! S3-compatible store via a custom endpoint).

use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use tracing::{info, warn};

use crate::shared::error::{PlatformError, Result};

/// Storage service configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible stores (MinIO, localstack)
    pub endpoint: Option<String>,
    pub presign_expiry_secs: u64,
    pub max_upload_bytes: u64,
}

/// A pre-signed upload slot returned to the client
#[derive(Debug, Clone)]
pub struct PresignedUpload {
    /// PUT this URL with the exact content type to upload
    pub upload_url: String,
    /// Object key the upload lands under
    pub storage_key: String,
    /// Seconds until the URL expires
    pub expires_in_secs: u64,
}

/// Object storage service for the media library
pub struct StorageService {
    client: aws_sdk_s3::Client,
    config: StorageConfig,
}

impl StorageService {
    /// Build the service from ambient AWS configuration plus overrides.
    pub async fn new(config: StorageConfig) -> Self {
        let base = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&base);
        if let Some(ref endpoint) = config.endpoint {
            // S3-compatible stores need path-style addressing
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let client = aws_sdk_s3::Client::from_conf(builder.build());
        info!(bucket = %config.bucket, "Storage service initialized");

        Self { client, config }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.config.max_upload_bytes
    }

    /// Create a pre-signed PUT URL for a direct upload.
    pub async fn presign_upload(
        &self,
        storage_key: &str,
        content_type: &str,
    ) -> Result<PresignedUpload> {
        let expiry = Duration::from_secs(self.config.presign_expiry_secs);
        let presigning = PresigningConfig::expires_in(expiry)
            .map_err(|e| PlatformError::storage(format!("Invalid presign expiry: {}", e)))?;

        let presigned = self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(storage_key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| PlatformError::storage(format!("Failed to presign upload: {}", e)))?;

        Ok(PresignedUpload {
            upload_url: presigned.uri().to_string(),
            storage_key: storage_key.to_string(),
            expires_in_secs: self.config.presign_expiry_secs,
        })
    }

    /// Confirm the uploaded object exists and return its size.
    pub async fn object_size(&self, storage_key: &str) -> Result<u64> {
        let head = self.client
            .head_object()
            .bucket(&self.config.bucket)
            .key(storage_key)
            .send()
            .await
            .map_err(|e| PlatformError::storage(format!("Uploaded object not found: {}", e)))?;

        Ok(head.content_length().unwrap_or(0).max(0) as u64)
    }

    /// Delete an object. Failures are logged but not fatal; the metadata
    /// record is the source of truth for the library.
    pub async fn delete_object(&self, storage_key: &str) {
        if let Err(e) = self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(storage_key)
            .send()
            .await
        {
            warn!(key = %storage_key, error = %e, "Failed to delete storage object");
        }
    }
}
