//! Lesson Progress Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// Per-student, per-lesson progress record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    pub student_id: String,

    pub lesson_id: String,

    /// Denormalized for per-course aggregation
    pub course_id: String,

    #[serde(default)]
    pub completed: bool,

    /// Accumulated watch time in seconds (monotonic)
    #[serde(default)]
    pub watch_seconds: u64,

    /// Last playback position in seconds
    #[serde(default)]
    pub last_position_seconds: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl LessonProgress {
    pub fn new(
        student_id: impl Into<String>,
        lesson_id: impl Into<String>,
        course_id: impl Into<String>,
    ) -> Self {
        Self {
            id: crate::TsidGenerator::generate(),
            student_id: student_id.into(),
            lesson_id: lesson_id.into(),
            course_id: course_id.into(),
            completed: false,
            watch_seconds: 0,
            last_position_seconds: 0,
            completed_at: None,
            updated_at: Utc::now(),
        }
    }

    /// Apply a playback heartbeat. Watch time only ever grows; stale or
    /// duplicate heartbeats cannot reduce it.
    pub fn record_heartbeat(&mut self, position_seconds: u32, watched_delta_seconds: u32) {
        self.last_position_seconds = position_seconds;
        self.watch_seconds = self.watch_seconds.saturating_add(watched_delta_seconds as u64);
        self.updated_at = Utc::now();
    }

    pub fn mark_complete(&mut self) {
        if !self.completed {
            self.completed = true;
            self.completed_at = Some(Utc::now());
        }
        self.updated_at = Utc::now();
    }

    pub fn mark_incomplete(&mut self) {
        self.completed = false;
        self.completed_at = None;
        self.updated_at = Utc::now();
    }
}

/// Completion percentage over published lessons.
///
/// A course with no published lessons reports 0, never a division error.
pub fn completion_percent(completed: u64, total_published: u64) -> f64 {
    if total_published == 0 {
        return 0.0;
    }
    (completed as f64 / total_published as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heartbeat_accumulates() {
        let mut progress = LessonProgress::new("s-1", "l-1", "c-1");
        progress.record_heartbeat(30, 30);
        progress.record_heartbeat(60, 30);
        assert_eq!(progress.watch_seconds, 60);
        assert_eq!(progress.last_position_seconds, 60);

        // Seeking backwards does not reduce accumulated watch time
        progress.record_heartbeat(10, 0);
        assert_eq!(progress.watch_seconds, 60);
        assert_eq!(progress.last_position_seconds, 10);
    }

    #[test]
    fn test_mark_complete_sets_timestamp_once() {
        let mut progress = LessonProgress::new("s-1", "l-1", "c-1");
        progress.mark_complete();
        let first = progress.completed_at;
        assert!(first.is_some());

        progress.mark_complete();
        assert_eq!(progress.completed_at, first);

        progress.mark_incomplete();
        assert!(!progress.completed);
        assert!(progress.completed_at.is_none());
    }

    #[test]
    fn test_completion_percent() {
        assert_eq!(completion_percent(0, 0), 0.0);
        assert_eq!(completion_percent(5, 0), 0.0);
        assert_eq!(completion_percent(1, 4), 25.0);
        assert_eq!(completion_percent(4, 4), 100.0);
    }
}
