//! Checkout Session Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use sf_common::Currency;

/// Checkout lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutStatus {
    /// Redirected to the processor, awaiting completion
    Pending,
    /// Payment confirmed via webhook
    Completed,
    /// Session expired or was abandoned
    Expired,
}

/// Local record of a processor checkout session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    pub course_id: String,

    pub student_id: String,

    /// Session ID assigned by the processor (e.g. "cs_...")
    pub processor_session_id: String,

    pub amount_cents: i64,

    pub currency: Currency,

    #[serde(default = "default_status")]
    pub status: CheckoutStatus,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

fn default_status() -> CheckoutStatus {
    CheckoutStatus::Pending
}

impl CheckoutSession {
    pub fn new(
        course_id: impl Into<String>,
        student_id: impl Into<String>,
        processor_session_id: impl Into<String>,
        amount_cents: i64,
        currency: Currency,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            course_id: course_id.into(),
            student_id: student_id.into(),
            processor_session_id: processor_session_id.into(),
            amount_cents,
            currency,
            status: CheckoutStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == CheckoutStatus::Pending
    }

    pub fn complete(&mut self) {
        self.status = CheckoutStatus::Completed;
        self.updated_at = Utc::now();
    }

    pub fn expire(&mut self) {
        self.status = CheckoutStatus::Expired;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_lifecycle() {
        let mut session = CheckoutSession::new("c-1", "s-1", "cs_123", 1999, Currency::Usd);
        assert!(session.is_pending());

        session.complete();
        assert_eq!(session.status, CheckoutStatus::Completed);
    }
}
