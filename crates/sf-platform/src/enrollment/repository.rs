//! Enrollment Repository

use chrono::{DateTime, Utc};
use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use crate::enrollment::entity::Enrollment;
use crate::shared::error::Result;

pub struct EnrollmentRepository {
    collection: Collection<Enrollment>,
}

impl EnrollmentRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("enrollments"),
        }
    }

    pub async fn insert(&self, enrollment: &Enrollment) -> Result<()> {
        self.collection.insert_one(enrollment).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Enrollment>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    /// The single non-revoked enrollment of a student in a course, if any
    pub async fn find_active(&self, student_id: &str, course_id: &str) -> Result<Option<Enrollment>> {
        Ok(self.collection
            .find_one(doc! {
                "studentId": student_id,
                "courseId": course_id,
                "status": "ACTIVE",
            })
            .await?)
    }

    /// Any enrollment record of a student in a course, revoked included
    pub async fn find_any(&self, student_id: &str, course_id: &str) -> Result<Option<Enrollment>> {
        Ok(self.collection
            .find_one(doc! { "studentId": student_id, "courseId": course_id })
            .await?)
    }

    pub async fn find_by_student(&self, student_id: &str) -> Result<Vec<Enrollment>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let cursor = self.collection
            .find(doc! { "studentId": student_id, "status": "ACTIVE" })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_by_course(&self, course_id: &str, skip: u64, limit: i64) -> Result<Vec<Enrollment>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit)
            .build();
        let cursor = self.collection
            .find(doc! { "courseId": course_id })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count_by_course(&self, course_id: &str) -> Result<u64> {
        Ok(self.collection.count_documents(doc! { "courseId": course_id }).await?)
    }

    /// Enrollment created by a given checkout (webhook idempotency check)
    pub async fn find_by_checkout(&self, checkout_id: &str) -> Result<Option<Enrollment>> {
        Ok(self.collection.find_one(doc! { "checkoutId": checkout_id }).await?)
    }

    /// Enrollments created in a time window, optionally restricted to a
    /// set of courses (analytics)
    pub async fn count_created_between(
        &self,
        course_ids: Option<&[String]>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64> {
        let mut filter = doc! {
            "createdAt": {
                "$gte": bson::DateTime::from_chrono(from),
                "$lt": bson::DateTime::from_chrono(to),
            }
        };
        if let Some(ids) = course_ids {
            filter.insert("courseId", doc! { "$in": ids });
        }
        Ok(self.collection.count_documents(filter).await?)
    }

    /// Active enrollments for a set of courses (analytics denominator)
    pub async fn find_active_by_courses(&self, course_ids: &[String]) -> Result<Vec<Enrollment>> {
        let cursor = self.collection
            .find(doc! { "courseId": { "$in": course_ids }, "status": "ACTIVE" })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, enrollment: &Enrollment) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &enrollment.id }, enrollment)
            .await?;
        Ok(())
    }
}
