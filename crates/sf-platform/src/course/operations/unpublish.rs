//! Unpublish Course Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::course::entity::CourseStatus;
use crate::CourseRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use super::events::CourseUnpublished;

/// Command for unpublishing a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpublishCourseCommand {
    /// Course ID
    pub course_id: String,
}

/// Use case for taking a course offline.
///
/// Existing enrollments keep content access; the course just leaves the
/// public catalog and rejects new checkouts.
pub struct UnpublishCourseUseCase<U: UnitOfWork> {
    course_repo: Arc<CourseRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> UnpublishCourseUseCase<U> {
    pub fn new(course_repo: Arc<CourseRepository>, unit_of_work: Arc<U>) -> Self {
        Self {
            course_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: UnpublishCourseCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<CourseUnpublished> {
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

        if course.status != CourseStatus::Published {
            return UseCaseResult::failure(UseCaseError::business_rule(
                "NOT_PUBLISHED",
                "Only published courses can be unpublished",
            ));
        }

        course.unpublish();

        let event = CourseUnpublished::new(&ctx, &course.id);
        self.unit_of_work.commit(&course, event, &command).await
    }
}
