//! Chapter Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// Chapter publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChapterStatus {
    Draft,
    Published,
}

impl Default for ChapterStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// Chapter entity - groups lessons inside a course
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Owning course
    pub course_id: String,

    /// Chapter title
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Zero-based position within the course
    pub position: u32,

    /// Whether lessons in this chapter are viewable without enrollment
    #[serde(default)]
    pub free_preview: bool,

    #[serde(default)]
    pub status: ChapterStatus,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Chapter {
    pub fn new(course_id: impl Into<String>, title: impl Into<String>, position: u32) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            course_id: course_id.into(),
            title: title.into(),
            description: None,
            position,
            free_preview: false,
            status: ChapterStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == ChapterStatus::Published
    }

    pub fn publish(&mut self) {
        self.status = ChapterStatus::Published;
        self.updated_at = Utc::now();
    }

    pub fn unpublish(&mut self) {
        self.status = ChapterStatus::Draft;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_chapter_is_draft() {
        let chapter = Chapter::new("course-1", "Getting Started", 0);
        assert_eq!(chapter.status, ChapterStatus::Draft);
        assert!(!chapter.free_preview);
        assert_eq!(chapter.position, 0);
    }
}
