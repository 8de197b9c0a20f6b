//! Event Entity
//!
//! CloudEvents spec 1.0 compliant event storage.
//! Immutable once created.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// CloudEvents spec version
pub const CLOUDEVENTS_SPEC_VERSION: &str = "1.0";

/// Event entity - immutable event storage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// CloudEvents: Event type
    /// Format: {application}:{subdomain}:{aggregate}:{event}
    #[serde(rename = "type")]
    pub event_type: String,

    /// CloudEvents: Event source URI
    pub source: String,

    /// CloudEvents: Event subject (optional context)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// CloudEvents: Timestamp of event occurrence
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub time: DateTime<Utc>,

    /// CloudEvents: Event payload data
    pub data: serde_json::Value,

    /// CloudEvents: Content type of data
    #[serde(default = "default_content_type")]
    pub data_content_type: String,

    /// CloudEvents spec version
    #[serde(default = "default_spec_version")]
    pub spec_version: String,

    /// Message group for FIFO ordering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_group: Option<String>,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// Causation ID - the event that caused this event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,

    /// Deduplication ID for exactly-once delivery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deduplication_id: Option<String>,

    /// Context data for filtering/searching
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_data: Vec<ContextData>,

    /// When the event was stored
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

fn default_content_type() -> String {
    "application/json".to_string()
}

fn default_spec_version() -> String {
    CLOUDEVENTS_SPEC_VERSION.to_string()
}

/// Context data for event filtering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextData {
    pub key: String,
    pub value: String,
}

impl Event {
    /// Create a new event with generated ID
    pub fn new(
        event_type: impl Into<String>,
        source: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: crate::TsidGenerator::generate(),
            event_type: event_type.into(),
            source: source.into(),
            subject: None,
            time: Utc::now(),
            data,
            data_content_type: default_content_type(),
            spec_version: default_spec_version(),
            message_group: None,
            correlation_id: None,
            causation_id: None,
            deduplication_id: None,
            context_data: vec![],
            created_at: Utc::now(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_message_group(mut self, group: impl Into<String>) -> Self {
        self.message_group = Some(group.into());
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = Event::new(
            "lms:catalog:course:published",
            "lms:catalog",
            serde_json::json!({ "courseId": "c-1" }),
        )
        .with_subject("catalog.course.c-1");

        assert_eq!(event.spec_version, CLOUDEVENTS_SPEC_VERSION);
        assert_eq!(event.subject.as_deref(), Some("catalog.course.c-1"));
        assert_eq!(event.data["courseId"], "c-1");
    }
}
