//! Checkout Repository

use chrono::{DateTime, Utc};
use mongodb::{Collection, Database, bson::doc};
use futures::TryStreamExt;
use crate::payment::entity::CheckoutSession;
use crate::shared::error::Result;

pub struct CheckoutRepository {
    collection: Collection<CheckoutSession>,
}

impl CheckoutRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("checkout_sessions"),
        }
    }

    pub async fn insert(&self, session: &CheckoutSession) -> Result<()> {
        self.collection.insert_one(session).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<CheckoutSession>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    /// Look up by the processor-assigned session id (webhook handling)
    pub async fn find_by_processor_session(
        &self,
        processor_session_id: &str,
    ) -> Result<Option<CheckoutSession>> {
        Ok(self.collection
            .find_one(doc! { "processorSessionId": processor_session_id })
            .await?)
    }

    pub async fn update(&self, session: &CheckoutSession) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &session.id }, session)
            .await?;
        Ok(())
    }

    // ========================================================================
    // Analytics aggregations
    // ========================================================================

    /// Sum of completed checkout amounts in a window, optionally
    /// restricted to a set of courses. Completion time is approximated by
    /// `updatedAt`, which the webhook sets when marking the session done.
    pub async fn sum_completed_revenue(
        &self,
        course_ids: Option<&[String]>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64> {
        let mut match_filter = doc! {
            "status": "COMPLETED",
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
            doc! { "$group": { "_id": null, "total": { "$sum": "$amountCents" } } },
        ];

        let mut cursor = self.collection.aggregate(pipeline).await?;
        if let Some(document) = cursor.try_next().await? {
            let total = document.get_i64("total")
                .or_else(|_| document.get_i32("total").map(|v| v as i64))
                .unwrap_or(0);
            return Ok(total);
        }
        Ok(0)
    }

    /// Per-course completed revenue in a window (top-courses table)
    pub async fn revenue_by_course(
        &self,
        course_ids: &[String],
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CourseRevenue>> {
        let pipeline = vec![
            doc! { "$match": {
                "status": "COMPLETED",
                "courseId": { "$in": course_ids },
                "updatedAt": {
                    "$gte": bson::DateTime::from_chrono(from),
                    "$lt": bson::DateTime::from_chrono(to),
                }
            }},
            doc! { "$group": {
                "_id": "$courseId",
                "revenueCents": { "$sum": "$amountCents" },
                "purchases": { "$sum": 1 },
            }},
        ];

        let mut cursor = self.collection.aggregate(pipeline).await?;
        let mut results = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            results.push(CourseRevenue {
                course_id: document.get_str("_id").unwrap_or_default().to_string(),
                revenue_cents: document.get_i64("revenueCents")
                    .or_else(|_| document.get_i32("revenueCents").map(|v| v as i64))
                    .unwrap_or(0),
                purchases: document.get_i32("purchases").unwrap_or(0) as u64,
            });
        }
        Ok(results)
    }
}

/// Aggregated revenue for one course
#[derive(Debug, Clone)]
pub struct CourseRevenue {
    pub course_id: String,
    pub revenue_cents: i64,
    pub purchases: u64,
}
