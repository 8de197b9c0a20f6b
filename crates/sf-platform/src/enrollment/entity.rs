//! Enrollment Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// How the enrollment came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentSource {
    /// Paid checkout completed
    Purchase,
    /// Self-service enrollment into a free course
    Free,
    /// Granted by an instructor or admin
    Granted,
}

/// Enrollment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Active,
    Revoked,
}

impl Default for EnrollmentStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Enrollment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    pub course_id: String,

    pub student_id: String,

    pub source: EnrollmentSource,

    #[serde(default)]
    pub status: EnrollmentStatus,

    /// Checkout session that paid for this enrollment (Purchase only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_id: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn new(
        course_id: impl Into<String>,
        student_id: impl Into<String>,
        source: EnrollmentSource,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            course_id: course_id.into(),
            student_id: student_id.into(),
            source,
            status: EnrollmentStatus::Active,
            checkout_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_checkout_id(mut self, checkout_id: impl Into<String>) -> Self {
        self.checkout_id = Some(checkout_id.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }

    pub fn revoke(&mut self) {
        self.status = EnrollmentStatus::Revoked;
        self.updated_at = Utc::now();
    }

    pub fn reinstate(&mut self) {
        self.status = EnrollmentStatus::Active;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrollment_lifecycle() {
        let mut enrollment = Enrollment::new("c-1", "s-1", EnrollmentSource::Free);
        assert!(enrollment.is_active());

        enrollment.revoke();
        assert!(!enrollment.is_active());

        enrollment.reinstate();
        assert!(enrollment.is_active());
    }

    #[test]
    fn test_purchase_enrollment_links_checkout() {
        let enrollment = Enrollment::new("c-1", "s-1", EnrollmentSource::Purchase)
            .with_checkout_id("chk-1");
        assert_eq!(enrollment.checkout_id.as_deref(), Some("chk-1"));
    }
}
