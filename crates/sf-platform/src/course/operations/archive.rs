//! Archive Course Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::course::entity::CourseStatus;
use crate::{CourseRepository, EnrollmentRepository};
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use super::events::CourseArchived;

/// Command for archiving a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveCourseCommand {
    /// Course ID
    pub course_id: String,

    /// Set to true to hard-delete a draft with no enrollments instead
    #[serde(default)]
    pub delete: bool,
}

/// Use case for archiving (or deleting) a course.
///
/// A course with enrollments can only be archived. Drafts without
/// enrollments may be deleted outright with `delete: true`.
pub struct ArchiveCourseUseCase<U: UnitOfWork> {
    course_repo: Arc<CourseRepository>,
    enrollment_repo: Arc<EnrollmentRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> ArchiveCourseUseCase<U> {
    pub fn new(
        course_repo: Arc<CourseRepository>,
        enrollment_repo: Arc<EnrollmentRepository>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            course_repo,
            enrollment_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: ArchiveCourseCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<CourseArchived> {
        let mut course = match self.course_repo.find_by_id(&command.course_id).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found(
                    "COURSE_NOT_FOUND",
                    command.course_id.clone(),
                ));
            }
            Err(e) => return UseCaseResult::failure(UseCaseError::commit(e.to_string())),
        };

        let enrollment_count = match self.enrollment_repo.count_by_course(&course.id).await {
            Ok(count) => count,
            Err(e) => return UseCaseResult::failure(UseCaseError::commit(e.to_string())),
        };

        if command.delete {
            if enrollment_count > 0 {
                return UseCaseResult::failure(UseCaseError::business_rule(
                    "COURSE_HAS_ENROLLMENTS",
                    "Courses with enrollments cannot be deleted, archive instead",
                ));
            }
            if course.status != CourseStatus::Draft {
                return UseCaseResult::failure(UseCaseError::business_rule(
                    "NOT_DRAFT",
                    "Only draft courses can be deleted",
                ));
            }

            let event = CourseArchived::new(&ctx, &course.id);
            return self.unit_of_work.commit_delete(&course, event, &command).await;
        }

        if course.status == CourseStatus::Archived {
            return UseCaseResult::failure(UseCaseError::business_rule(
                "ALREADY_ARCHIVED",
                "Course is already archived",
            ));
        }

        course.archive();

        let event = CourseArchived::new(&ctx, &course.id);
        self.unit_of_work.commit(&course, event, &command).await
    }
}
