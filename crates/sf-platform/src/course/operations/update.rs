//! Update Course Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use sf_common::Currency;

use crate::course::entity::CourseStatus;
use crate::CourseRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use super::events::CourseUpdated;

/// Command for updating course fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseCommand {
    /// Course ID
    pub course_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,

    /// New price in minor units; explicit 0 makes the course free
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Cover image media asset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_asset_id: Option<String>,
}

/// Use case for updating a course.
pub struct UpdateCourseUseCase<U: UnitOfWork> {
    course_repo: Arc<CourseRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> UpdateCourseUseCase<U> {
    pub fn new(course_repo: Arc<CourseRepository>, unit_of_work: Arc<U>) -> Self {
        Self {
            course_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: UpdateCourseCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<CourseUpdated> {
        let mut course = match self.course_repo.find_by_id(&command.course_id).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found(
                    "COURSE_NOT_FOUND",
                    command.course_id.clone(),
                ));
            }
            Err(e) => {
                return UseCaseResult::failure(UseCaseError::commit(e.to_string()));
            }
        };

        // Business rule: archived courses are immutable
        if course.status == CourseStatus::Archived {
            return UseCaseResult::failure(UseCaseError::business_rule(
                "COURSE_ARCHIVED",
                "Archived courses cannot be updated",
            ));
        }

        if let Some(ref title) = command.title {
            let title = title.trim();
            if title.is_empty() {
                return UseCaseResult::failure(UseCaseError::validation(
                    "TITLE_REQUIRED",
                    "Course title must not be empty",
                ));
            }
            course.title = title.to_string();
            // Slug stays stable once published so shared links keep working
            if course.status == CourseStatus::Draft {
                let slug = crate::course::entity::slugify(title);
                if !slug.is_empty() {
                    course.slug = slug;
                }
            }
        }

        if let Some(ref desc) = command.description {
            course.description = Some(desc.clone());
        }
        if let Some(ref cid) = command.category_id {
            course.category_id = Some(cid.clone());
        }
        if let Some(price) = command.price_cents {
            if price < 0 {
                return UseCaseResult::failure(UseCaseError::validation(
                    "PRICE_NEGATIVE",
                    "Course price must not be negative",
                ));
            }
            course.price_cents = Some(price);
            // Stored processor price no longer matches
            course.payment_price_id = None;
        }
        if let Some(ref code) = command.currency {
            match Currency::parse(code) {
                Some(c) => course.currency = c,
                None => {
                    return UseCaseResult::failure(UseCaseError::validation(
                        "CURRENCY_UNSUPPORTED",
                        format!("Unsupported currency: {}", code),
                    ));
                }
            }
        }
        if let Some(ref asset_id) = command.image_asset_id {
            course.image_asset_id = Some(asset_id.clone());
        }

        course.updated_at = chrono::Utc::now();

        let event = CourseUpdated::new(&ctx, &course);
        self.unit_of_work.commit(&course, event, &command).await
    }
}
