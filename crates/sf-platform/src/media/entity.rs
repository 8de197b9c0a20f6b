//! Media Asset Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// What kind of content the asset holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaKind {
    Video,
    Image,
    Attachment,
}

impl MediaKind {
    /// Accepted content-type prefixes per kind
    pub fn accepts_content_type(&self, content_type: &str) -> bool {
        match self {
            MediaKind::Video => content_type.starts_with("video/"),
            MediaKind::Image => content_type.starts_with("image/"),
            MediaKind::Attachment => !content_type.is_empty(),
        }
    }
}

/// Upload lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaStatus {
    /// Upload URL issued, object not yet confirmed
    Pending,
    /// Upload finalized, object available
    Ready,
    /// Upload abandoned or failed
    Failed,
}

/// Media asset entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Owning principal
    pub owner_id: String,

    /// Original file name
    pub file_name: String,

    pub content_type: String,

    /// Size in bytes, recorded at finalize
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    pub kind: MediaKind,

    /// Object storage key: media/{owner_id}/{asset_id}/{file_name}
    pub storage_key: String,

    #[serde(default = "default_status")]
    pub status: MediaStatus,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

fn default_status() -> MediaStatus {
    MediaStatus::Pending
}

impl MediaAsset {
    pub fn new(
        owner_id: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        kind: MediaKind,
    ) -> Self {
        let owner_id = owner_id.into();
        let file_name = sanitize_file_name(&file_name.into());
        let id = crate::TsidGenerator::generate();
        let storage_key = format!("media/{}/{}/{}", owner_id, id, file_name);
        let now = Utc::now();

        Self {
            id,
            owner_id,
            file_name,
            content_type: content_type.into(),
            size_bytes: None,
            kind,
            storage_key,
            status: MediaStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }

    pub fn finalize(&mut self, size_bytes: u64) {
        self.status = MediaStatus::Ready;
        self.size_bytes = Some(size_bytes);
        self.updated_at = Utc::now();
    }

    pub fn fail(&mut self) {
        self.status = MediaStatus::Failed;
        self.updated_at = Utc::now();
    }
}

/// Strip path separators and control characters from an upload file name
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_layout() {
        let asset = MediaAsset::new("owner-1", "intro.mp4", "video/mp4", MediaKind::Video);
        assert_eq!(
            asset.storage_key,
            format!("media/owner-1/{}/intro.mp4", asset.id)
        );
        assert_eq!(asset.status, MediaStatus::Pending);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    #[test]
    fn test_kind_content_type_check() {
        assert!(MediaKind::Video.accepts_content_type("video/mp4"));
        assert!(!MediaKind::Video.accepts_content_type("image/png"));
        assert!(MediaKind::Attachment.accepts_content_type("application/pdf"));
    }

    #[test]
    fn test_finalize() {
        let mut asset = MediaAsset::new("o-1", "a.png", "image/png", MediaKind::Image);
        asset.finalize(1024);
        assert_eq!(asset.status, MediaStatus::Ready);
        assert_eq!(asset.size_bytes, Some(1024));
    }
}
