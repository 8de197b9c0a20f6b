//! Progress Repository

use chrono::{DateTime, Utc};
use mongodb::{Collection, Database, bson::doc};
use futures::TryStreamExt;
use crate::progress::entity::LessonProgress;
use crate::shared::error::Result;

pub struct ProgressRepository {
    collection: Collection<LessonProgress>,
}

impl ProgressRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("lesson_progress"),
        }
    }

    pub async fn insert(&self, progress: &LessonProgress) -> Result<()> {
        self.collection.insert_one(progress).await?;
        Ok(())
    }

    pub async fn find_by_student_and_lesson(
        &self,
        student_id: &str,
        lesson_id: &str,
    ) -> Result<Option<LessonProgress>> {
        Ok(self.collection
            .find_one(doc! { "studentId": student_id, "lessonId": lesson_id })
            .await?)
    }

    pub async fn find_by_student_and_course(
        &self,
        student_id: &str,
        course_id: &str,
    ) -> Result<Vec<LessonProgress>> {
        let cursor = self.collection
            .find(doc! { "studentId": student_id, "courseId": course_id })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_completed(&self, student_id: &str, course_id: &str) -> Result<u64> {
        Ok(self.collection
            .count_documents(doc! {
                "studentId": student_id,
                "courseId": course_id,
                "completed": true,
            })
            .await?)
    }

    pub async fn update(&self, progress: &LessonProgress) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &progress.id }, progress)
            .await?;
        Ok(())
    }

    // ========================================================================
    // Analytics aggregations
    // ========================================================================

    /// Distinct students with a progress update in the window, optionally
    /// restricted to a set of courses.
    pub async fn count_active_students(
        &self,
        course_ids: Option<&[String]>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64> {
        let mut filter = doc! {
            "updatedAt": {
                "$gte": bson::DateTime::from_chrono(from),
                "$lt": bson::DateTime::from_chrono(to),
            }
        };
        if let Some(ids) = course_ids {
            filter.insert("courseId", doc! { "$in": ids });
        }

        let values = self.collection.distinct("studentId", filter).await?;
        Ok(values.len() as u64)
    }

    /// Completed (student, course) pairs: students that finished every
    /// published lesson are counted per course by the analytics service;
    /// this returns the per-student completed-lesson counts in one pass.
    pub async fn completed_lesson_counts(
        &self,
        course_ids: &[String],
    ) -> Result<Vec<CompletedCount>> {
        let pipeline = vec![
            doc! { "$match": { "courseId": { "$in": course_ids }, "completed": true } },
            doc! { "$group": {
                "_id": { "studentId": "$studentId", "courseId": "$courseId" },
                "completedLessons": { "$sum": 1 },
                "lastCompletedAt": { "$max": "$completedAt" },
            }},
        ];

        let mut cursor = self.collection.aggregate(pipeline).await?;
        let mut results = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            let id = document.get_document("_id").cloned().unwrap_or_default();
            results.push(CompletedCount {
                student_id: id.get_str("studentId").unwrap_or_default().to_string(),
                course_id: id.get_str("courseId").unwrap_or_default().to_string(),
                completed_lessons: document.get_i32("completedLessons").unwrap_or(0) as u64,
                last_completed_at: document.get_datetime("lastCompletedAt").ok().map(|d| d.to_chrono()),
            });
        }
        Ok(results)
    }

    /// Sum of watch seconds recorded in the window. Watch time is
    /// attributed to the window of the last heartbeat that touched the
    /// record.
    pub async fn sum_watch_seconds(
        &self,
        course_ids: Option<&[String]>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64> {
        let mut match_filter = doc! {
            "updatedAt": {
                "$gte": bson::DateTime::from_chrono(from),
                "$lt": bson::DateTime::from_chrono(to),
            }
        };
        if let Some(ids) = course_ids {
            match_filter.insert("courseId", doc! { "$in": ids });
        }

        let pipeline = vec![
            doc! { "$match": match_filter },
            doc! { "$group": { "_id": null, "total": { "$sum": "$watchSeconds" } } },
        ];

        let mut cursor = self.collection.aggregate(pipeline).await?;
        if let Some(document) = cursor.try_next().await? {
            let total = document.get_i64("total")
                .or_else(|_| document.get_i32("total").map(|v| v as i64))
                .unwrap_or(0);
            return Ok(total.max(0) as u64);
        }
        Ok(0)
    }
}

/// Per-student completed-lesson count within a course
#[derive(Debug, Clone)]
pub struct CompletedCount {
    pub student_id: String,
    pub course_id: String,
    pub completed_lessons: u64,
    /// When the latest lesson completion happened (course completion time
    /// once the count reaches the published-lesson total)
    pub last_completed_at: Option<DateTime<Utc>>,
}
