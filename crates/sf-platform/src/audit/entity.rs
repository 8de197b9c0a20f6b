//! Audit Log Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Entity type affected (e.g., "Course", "Enrollment", "Principal")
    pub entity_type: String,

    /// Entity ID affected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    /// Operation name - the command struct simple name (e.g., "PublishCourseCommand")
    pub operation: String,

    /// Full operation payload as JSON string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_json: Option<String>,

    /// Principal who performed the action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,

    /// Timestamp
    #[serde(alias = "createdAt", with = "chrono_datetime_as_bson_datetime")]
    pub performed_at: DateTime<Utc>,
}

impl AuditLog {
    /// Create a new audit log entry
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: Option<String>,
        operation: impl Into<String>,
        operation_json: Option<String>,
        principal_id: Option<String>,
    ) -> Self {
        Self {
            id: crate::TsidGenerator::generate(),
            entity_type: entity_type.into(),
            entity_id,
            operation: operation.into(),
            operation_json,
            principal_id,
            performed_at: Utc::now(),
        }
    }

    pub fn with_performed_at(mut self, performed_at: DateTime<Utc>) -> Self {
        self.performed_at = performed_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_log_creation() {
        let log = AuditLog::new(
            "Course",
            Some("c-1".to_string()),
            "PublishCourseCommand",
            None,
            Some("p-1".to_string()),
        );
        assert_eq!(log.entity_type, "Course");
        assert_eq!(log.operation, "PublishCourseCommand");
        assert_eq!(log.id.len(), 13);
    }
}
