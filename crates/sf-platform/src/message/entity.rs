//! Conversation and Message Entities

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// A conversation between one student and one instructor about one course
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    pub course_id: String,

    pub student_id: String,

    pub instructor_id: String,

    /// Timestamp of the latest message (conversation list ordering)
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub last_message_at: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(
        course_id: impl Into<String>,
        student_id: impl Into<String>,
        instructor_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            course_id: course_id.into(),
            student_id: student_id.into(),
            instructor_id: instructor_id.into(),
            last_message_at: now,
            created_at: now,
        }
    }

    pub fn is_participant(&self, principal_id: &str) -> bool {
        self.student_id == principal_id || self.instructor_id == principal_id
    }

    /// The other participant of the conversation
    pub fn counterpart(&self, principal_id: &str) -> Option<&str> {
        if self.student_id == principal_id {
            Some(&self.instructor_id)
        } else if self.instructor_id == principal_id {
            Some(&self.student_id)
        } else {
            None
        }
    }

    pub fn touch(&mut self) {
        self.last_message_at = Utc::now();
    }
}

/// A single message inside a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    pub conversation_id: String,

    pub sender_id: String,

    /// Plain-text body
    pub body: String,

    /// Whether the recipient has read this message
    #[serde(default)]
    pub read: bool,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Messages longer than this are rejected
    pub const MAX_BODY_CHARS: usize = 4000;

    pub fn new(
        conversation_id: impl Into<String>,
        sender_id: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: crate::TsidGenerator::generate(),
            conversation_id: conversation_id.into(),
            sender_id: sender_id.into(),
            body: body.into(),
            read: false,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participants() {
        let conv = Conversation::new("c-1", "student-1", "instructor-1");
        assert!(conv.is_participant("student-1"));
        assert!(conv.is_participant("instructor-1"));
        assert!(!conv.is_participant("other"));

        assert_eq!(conv.counterpart("student-1"), Some("instructor-1"));
        assert_eq!(conv.counterpart("instructor-1"), Some("student-1"));
        assert_eq!(conv.counterpart("other"), None);
    }
}
