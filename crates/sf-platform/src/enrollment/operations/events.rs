//! Enrollment Domain Events

use serde::{Deserialize, Serialize};
use crate::usecase::ExecutionContext;
use crate::usecase::domain_event::EventMetadata;
use crate::TsidGenerator;
use crate::impl_domain_event;

const SPEC_VERSION: &str = "1.0";
const SOURCE: &str = "lms:learning";

fn enrollment_subject(enrollment_id: &str) -> String {
    format!("learning.enrollment.{}", enrollment_id)
}

fn enrollment_group(enrollment_id: &str) -> String {
    format!("learning:enrollment:{}", enrollment_id)
}

/// Event emitted when a student gains access to a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentCreated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub enrollment_id: String,
    pub course_id: String,
    pub student_id: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_id: Option<String>,
}

impl_domain_event!(EnrollmentCreated);

impl EnrollmentCreated {
    const EVENT_TYPE: &'static str = "lms:learning:enrollment:created";

    pub fn new(ctx: &ExecutionContext, enrollment: &crate::Enrollment) -> Self {
        Self {
            metadata: EventMetadata::new(
                TsidGenerator::generate(),
                Self::EVENT_TYPE,
                SPEC_VERSION,
                SOURCE,
                enrollment_subject(&enrollment.id),
                enrollment_group(&enrollment.id),
                ctx.execution_id.clone(),
                ctx.correlation_id.clone(),
                ctx.causation_id.clone(),
                ctx.principal_id.clone(),
            ),
            enrollment_id: enrollment.id.clone(),
            course_id: enrollment.course_id.clone(),
            student_id: enrollment.student_id.clone(),
            source: format!("{:?}", enrollment.source).to_uppercase(),
            checkout_id: enrollment.checkout_id.clone(),
        }
    }
}

/// Event emitted when an enrollment is revoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRevoked {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub enrollment_id: String,
    pub course_id: String,
    pub student_id: String,
}

impl_domain_event!(EnrollmentRevoked);

impl EnrollmentRevoked {
    const EVENT_TYPE: &'static str = "lms:learning:enrollment:revoked";

    pub fn new(ctx: &ExecutionContext, enrollment: &crate::Enrollment) -> Self {
        Self {
            metadata: EventMetadata::new(
                TsidGenerator::generate(),
                Self::EVENT_TYPE,
                SPEC_VERSION,
                SOURCE,
                enrollment_subject(&enrollment.id),
                enrollment_group(&enrollment.id),
                ctx.execution_id.clone(),
                ctx.correlation_id.clone(),
                ctx.causation_id.clone(),
                ctx.principal_id.clone(),
            ),
            enrollment_id: enrollment.id.clone(),
            course_id: enrollment.course_id.clone(),
            student_id: enrollment.student_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrollment::entity::{Enrollment, EnrollmentSource};
    use crate::usecase::DomainEvent;

    #[test]
    fn test_enrollment_created_event() {
        let ctx = ExecutionContext::create("student-1");
        let enrollment = Enrollment::new("c-1", "student-1", EnrollmentSource::Free);
        let event = EnrollmentCreated::new(&ctx, &enrollment);

        assert_eq!(event.event_type(), "lms:learning:enrollment:created");
        assert_eq!(event.source, "FREE");
        assert_eq!(event.course_id, "c-1");
    }
}
