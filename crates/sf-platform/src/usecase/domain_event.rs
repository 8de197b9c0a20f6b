//! Domain Event Trait
//!
//! Base trait for all domain events. Events follow the CloudEvents specification
//! structure with additional fields for tracing and ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base trait for all domain events.
///
/// Domain events represent facts about what happened in the domain (past tense).
/// Each event has its own schema and is stored in the event store.
///
/// # Event Type Convention
///
/// Events are named in past tense describing what happened:
/// - `CoursePublished` (not PublishCourse)
/// - `EnrollmentCreated` (not CreateEnrollment)
///
/// # Event Type Format
///
/// The event type follows the format: `{app}:{domain}:{aggregate}:{action}`
/// Example: `lms:catalog:course:published`
///
/// # Subject Format
///
/// The subject is a qualified aggregate identifier: `{domain}.{aggregate}.{id}`
/// Example: `catalog.course.0HZXEQ5Y8JY5Z`
///
/// # Message Group
///
/// Events in the same message group are processed in order.
/// Format: `{domain}:{aggregate}:{id}`
pub trait DomainEvent: Send + Sync {
    /// Unique identifier for this event (TSID Crockford Base32 string).
    fn event_id(&self) -> &str;

    /// Event type code following the format: `{app}:{domain}:{aggregate}:{action}`
    fn event_type(&self) -> &str;

    /// Schema version of this event type (e.g., "1.0").
    fn spec_version(&self) -> &str;

    /// Source system that generated this event.
    fn source(&self) -> &str;

    /// Qualified aggregate identifier: `{domain}.{aggregate}.{id}`
    fn subject(&self) -> &str;

    /// When the event occurred.
    fn time(&self) -> DateTime<Utc>;

    /// Execution ID for tracking a single use case execution.
    fn execution_id(&self) -> &str;

    /// Correlation ID for distributed tracing.
    fn correlation_id(&self) -> &str;

    /// ID of the event that caused this event (if any).
    fn causation_id(&self) -> Option<&str>;

    /// Principal who initiated the action that produced this event.
    fn principal_id(&self) -> &str;

    /// Message group for ordering guarantees.
    fn message_group(&self) -> &str;

    /// Serialize the event-specific data payload to JSON.
    fn to_data_json(&self) -> String;
}

/// Common metadata for domain events.
///
/// Holds the common CloudEvents fields and tracing context. Event
/// implementations include this as a field and delegate the trait
/// methods to it via `impl_domain_event!`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    pub event_id: String,
    pub event_type: String,
    pub spec_version: String,
    pub source: String,
    pub subject: String,
    pub time: DateTime<Utc>,
    pub execution_id: String,
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,
    pub principal_id: String,
    pub message_group: String,
}

impl EventMetadata {
    /// Create new event metadata from an execution context.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        event_id: String,
        event_type: &str,
        spec_version: &str,
        source: &str,
        subject: String,
        message_group: String,
        execution_id: String,
        correlation_id: String,
        causation_id: Option<String>,
        principal_id: String,
    ) -> Self {
        Self {
            event_id,
            event_type: event_type.to_string(),
            spec_version: spec_version.to_string(),
            source: source.to_string(),
            subject,
            time: Utc::now(),
            execution_id,
            correlation_id,
            causation_id,
            principal_id,
            message_group,
        }
    }
}

/// Helper macro for implementing the DomainEvent trait.
///
/// Generates the trait implementation by delegating to an
/// `EventMetadata` field named `metadata`.
///
/// # Example
///
/// ```ignore
/// use sf_platform::usecase::{DomainEvent, EventMetadata};
/// use sf_platform::impl_domain_event;
///
/// pub struct CoursePublished {
///     metadata: EventMetadata,
///     pub course_id: String,
/// }
///
/// impl_domain_event!(CoursePublished);
/// ```
#[macro_export]
macro_rules! impl_domain_event {
    ($event_type:ty) => {
        impl $crate::usecase::DomainEvent for $event_type {
            fn event_id(&self) -> &str {
                &self.metadata.event_id
            }

            fn event_type(&self) -> &str {
                &self.metadata.event_type
            }

            fn spec_version(&self) -> &str {
                &self.metadata.spec_version
            }

            fn source(&self) -> &str {
                &self.metadata.source
            }

            fn subject(&self) -> &str {
                &self.metadata.subject
            }

            fn time(&self) -> chrono::DateTime<chrono::Utc> {
                self.metadata.time
            }

            fn execution_id(&self) -> &str {
                &self.metadata.execution_id
            }

            fn correlation_id(&self) -> &str {
                &self.metadata.correlation_id
            }

            fn causation_id(&self) -> Option<&str> {
                self.metadata.causation_id.as_deref()
            }

            fn principal_id(&self) -> &str {
                &self.metadata.principal_id
            }

            fn message_group(&self) -> &str {
                &self.metadata.message_group
            }

            fn to_data_json(&self) -> String {
                serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Clone, Serialize)]
    struct TestEvent {
        metadata: EventMetadata,
        pub test_field: String,
    }

    impl_domain_event!(TestEvent);

    #[test]
    fn test_event_metadata() {
        let metadata = EventMetadata::new(
            "evt-123".to_string(),
            "lms:catalog:course:published",
            "1.0",
            "lms:catalog",
            "catalog.course.123".to_string(),
            "catalog:course:123".to_string(),
            "exec-456".to_string(),
            "corr-789".to_string(),
            None,
            "principal-001".to_string(),
        );

        let event = TestEvent {
            metadata,
            test_field: "test value".to_string(),
        };

        assert_eq!(event.event_id(), "evt-123");
        assert_eq!(event.event_type(), "lms:catalog:course:published");
        assert_eq!(event.subject(), "catalog.course.123");
        assert_eq!(event.execution_id(), "exec-456");
        assert!(event.causation_id().is_none());
        assert_eq!(event.message_group(), "catalog:course:123");
    }

    #[test]
    fn test_to_data_json() {
        let metadata = EventMetadata::new(
            "evt-123".to_string(),
            "lms:catalog:course:published",
            "1.0",
            "lms:catalog",
            "catalog.course.123".to_string(),
            "catalog:course:123".to_string(),
            "exec-456".to_string(),
            "corr-789".to_string(),
            None,
            "principal-001".to_string(),
        );

        let event = TestEvent {
            metadata,
            test_field: "test value".to_string(),
        };

        let json = event.to_data_json();
        assert!(json.contains("test_field"));
        assert!(json.contains("test value"));
    }
}
