//! Lesson Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// Lesson publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonStatus {
    Draft,
    Published,
}

impl Default for LessonStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// Lesson entity - the playable unit inside a chapter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Owning chapter
    pub chapter_id: String,

    /// Owning course (denormalized for progress and analytics queries)
    pub course_id: String,

    /// Lesson title
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Zero-based position within the chapter
    pub position: u32,

    /// Attached video media asset (must be Ready before publishing)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_asset_id: Option<String>,

    /// Playback duration in seconds, recorded when the video is attached
    #[serde(default)]
    pub duration_seconds: u32,

    #[serde(default)]
    pub status: LessonStatus,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    pub fn new(
        chapter_id: impl Into<String>,
        course_id: impl Into<String>,
        title: impl Into<String>,
        position: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            chapter_id: chapter_id.into(),
            course_id: course_id.into(),
            title: title.into(),
            description: None,
            position,
            video_asset_id: None,
            duration_seconds: 0,
            status: LessonStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == LessonStatus::Published
    }

    pub fn attach_video(&mut self, asset_id: impl Into<String>, duration_seconds: u32) {
        self.video_asset_id = Some(asset_id.into());
        self.duration_seconds = duration_seconds;
        self.updated_at = Utc::now();
    }

    pub fn detach_video(&mut self) {
        self.video_asset_id = None;
        self.duration_seconds = 0;
        // A lesson without a video cannot stay published
        self.status = LessonStatus::Draft;
        self.updated_at = Utc::now();
    }

    pub fn publish(&mut self) {
        self.status = LessonStatus::Published;
        self.updated_at = Utc::now();
    }

    pub fn unpublish(&mut self) {
        self.status = LessonStatus::Draft;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detach_video_unpublishes() {
        let mut lesson = Lesson::new("ch-1", "c-1", "Intro", 0);
        lesson.attach_video("asset-1", 300);
        lesson.publish();
        assert!(lesson.is_published());

        lesson.detach_video();
        assert!(!lesson.is_published());
        assert_eq!(lesson.duration_seconds, 0);
    }
}
