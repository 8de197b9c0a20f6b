//! Enroll Use Case
//!
//! Covers self-service enrollment into free courses and instructor/admin
//! grants. Purchase enrollments are created by checkout fulfillment in the
//! payment module, not here.

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::enrollment::entity::{Enrollment, EnrollmentSource};
use crate::{CourseRepository, EnrollmentRepository};
use crate::usecase::{
    ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult,
    unit_of_work::HasId,
};
use super::events::EnrollmentCreated;

impl HasId for Enrollment {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        "enrollments"
    }
}

/// Command for enrolling a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollCommand {
    pub course_id: String,

    pub student_id: String,

    /// True when an instructor/admin grants access regardless of price
    #[serde(default)]
    pub granted: bool,
}

/// Use case for enrolling a student into a course.
pub struct EnrollUseCase<U: UnitOfWork> {
    enrollment_repo: Arc<EnrollmentRepository>,
    course_repo: Arc<CourseRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> EnrollUseCase<U> {
    pub fn new(
        enrollment_repo: Arc<EnrollmentRepository>,
        course_repo: Arc<CourseRepository>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            enrollment_repo,
            course_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: EnrollCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<EnrollmentCreated> {
        let course = match self.course_repo.find_by_id(&command.course_id).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found(
                    "COURSE_NOT_FOUND",
                    command.course_id.clone(),
                ));
            }
            Err(e) => return UseCaseResult::failure(UseCaseError::commit(e.to_string())),
        };

        // Business rule: only published courses accept enrollments
        if !course.is_published() {
            return UseCaseResult::failure(UseCaseError::business_rule(
                "COURSE_NOT_PUBLISHED",
                "Cannot enroll into an unpublished course",
            ));
        }

        // Business rule: paid courses require checkout unless granted
        if !command.granted && !course.is_free() {
            return UseCaseResult::failure(UseCaseError::business_rule(
                "COURSE_REQUIRES_PURCHASE",
                "This course requires purchase through checkout",
            ));
        }

        // Business rule: one non-revoked enrollment per (student, course)
        match self.enrollment_repo.find_active(&command.student_id, &command.course_id).await {
            Ok(Some(_)) => {
                return UseCaseResult::failure(UseCaseError::business_rule(
                    "ALREADY_ENROLLED",
                    "Student is already enrolled in this course",
                ));
            }
            Ok(None) => {}
            Err(e) => return UseCaseResult::failure(UseCaseError::commit(e.to_string())),
        }

        let source = if command.granted {
            EnrollmentSource::Granted
        } else {
            EnrollmentSource::Free
        };
        let enrollment = Enrollment::new(&command.course_id, &command.student_id, source);

        let event = EnrollmentCreated::new(&ctx, &enrollment);
        self.unit_of_work.commit(&enrollment, event, &command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrollment_has_id() {
        let enrollment = Enrollment::new("c-1", "s-1", EnrollmentSource::Free);
        assert!(!HasId::id(&enrollment).is_empty());
        assert_eq!(Enrollment::collection_name(), "enrollments");
    }

    #[test]
    fn test_command_serialization() {
        let cmd = EnrollCommand {
            course_id: "c-1".to_string(),
            student_id: "s-1".to_string(),
            granted: true,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"granted\":true"));
    }
}
