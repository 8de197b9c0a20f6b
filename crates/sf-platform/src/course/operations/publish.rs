//! Publish Course Use Case
//!
//! Publishing validates that the course has playable content, then makes
//! sure the payment processor has a matching product and price before the
//! course goes live.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::course::entity::CourseStatus;
use crate::payment::client::PaymentClient;
use crate::{ChapterRepository, CourseRepository, LessonRepository};
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use super::events::CoursePublished;

/// Command for publishing a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishCourseCommand {
    /// Course ID
    pub course_id: String,
}

/// Use case for publishing a course.
pub struct PublishCourseUseCase<U: UnitOfWork> {
    course_repo: Arc<CourseRepository>,
    chapter_repo: Arc<ChapterRepository>,
    lesson_repo: Arc<LessonRepository>,
    /// Absent when payments are not configured; paid courses then
    /// cannot be published.
    payment_client: Option<Arc<PaymentClient>>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> PublishCourseUseCase<U> {
    pub fn new(
        course_repo: Arc<CourseRepository>,
        chapter_repo: Arc<ChapterRepository>,
        lesson_repo: Arc<LessonRepository>,
        payment_client: Option<Arc<PaymentClient>>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            course_repo,
            chapter_repo,
            lesson_repo,
            payment_client,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: PublishCourseCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<CoursePublished> {
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

        if course.status == CourseStatus::Published {
            return UseCaseResult::failure(UseCaseError::business_rule(
                "ALREADY_PUBLISHED",
                "Course is already published",
            ));
        }
        if course.status == CourseStatus::Archived {
            return UseCaseResult::failure(UseCaseError::business_rule(
                "COURSE_ARCHIVED",
                "Archived courses cannot be published",
            ));
        }

        // Validation: description required for the catalog page
        if course.description.as_deref().map_or(true, |d| d.trim().is_empty()) {
            return UseCaseResult::failure(UseCaseError::validation(
                "DESCRIPTION_REQUIRED",
                "A description is required before publishing",
            ));
        }

        // Validation: at least one published chapter with a published lesson
        let published_chapters = match self.chapter_repo.find_published_by_course(&course.id).await {
            Ok(chapters) => chapters,
            Err(e) => return UseCaseResult::failure(UseCaseError::commit(e.to_string())),
        };
        if published_chapters.is_empty() {
            return UseCaseResult::failure(UseCaseError::business_rule(
                "NO_PUBLISHED_CHAPTERS",
                "Publish at least one chapter first",
            ));
        }

        let published_lessons = match self.lesson_repo.find_published_by_course(&course.id).await {
            Ok(lessons) => lessons,
            Err(e) => return UseCaseResult::failure(UseCaseError::commit(e.to_string())),
        };
        let chapter_ids: std::collections::HashSet<&str> =
            published_chapters.iter().map(|c| c.id.as_str()).collect();
        let has_playable_lesson = published_lessons
            .iter()
            .any(|l| chapter_ids.contains(l.chapter_id.as_str()));
        if !has_playable_lesson {
            return UseCaseResult::failure(UseCaseError::business_rule(
                "NO_PUBLISHED_LESSONS",
                "Publish at least one lesson in a published chapter first",
            ));
        }

        // Paid courses need a processor product and price before checkout
        // sessions can be created against them.
        if !course.is_free() {
            let Some(client) = &self.payment_client else {
                return UseCaseResult::failure(UseCaseError::business_rule(
                    "PAYMENTS_NOT_CONFIGURED",
                    "Cannot publish a paid course without a configured payment processor",
                ));
            };

            if course.payment_product_id.is_none() {
                match client.create_product(&course.title, &course.id).await {
                    Ok(product_id) => course.payment_product_id = Some(product_id),
                    Err(e) => {
                        return UseCaseResult::failure(UseCaseError::commit(format!(
                            "Failed to create processor product: {}", e
                        )));
                    }
                }
            }

            if course.payment_price_id.is_none() {
                let product_id = course.payment_product_id.clone().unwrap_or_default();
                let amount = course.price_cents.unwrap_or(0);
                match client.create_price(&product_id, amount, course.currency.code()).await {
                    Ok(price_id) => course.payment_price_id = Some(price_id),
                    Err(e) => {
                        return UseCaseResult::failure(UseCaseError::commit(format!(
                            "Failed to create processor price: {}", e
                        )));
                    }
                }
            }

            info!(
                course_id = %course.id,
                product_id = ?course.payment_product_id,
                "Processor product synced for paid course"
            );
        }

        course.publish();

        let event = CoursePublished::new(&ctx, &course);
        self.unit_of_work.commit(&course, event, &command).await
    }
}
