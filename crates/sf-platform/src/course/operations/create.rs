//! Create Course Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use sf_common::Currency;

use crate::Course;
use crate::CourseRepository;
use crate::usecase::{
    ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult,
    unit_of_work::HasId,
};
use super::events::CourseCreated;

impl HasId for Course {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        "courses"
    }
}

/// Command for creating a new course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseCommand {
    /// Course title
    pub title: String,

    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Category ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,

    /// Price in minor units (omit for free courses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,

    /// ISO currency code, defaults to usd
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Use case for creating a new course.
pub struct CreateCourseUseCase<U: UnitOfWork> {
    course_repo: Arc<CourseRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> CreateCourseUseCase<U> {
    pub fn new(course_repo: Arc<CourseRepository>, unit_of_work: Arc<U>) -> Self {
        Self {
            course_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: CreateCourseCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<CourseCreated> {
        // Validation: title is required
        let title = command.title.trim();
        if title.is_empty() {
            return UseCaseResult::failure(UseCaseError::validation(
                "TITLE_REQUIRED",
                "Course title is required",
            ));
        }

        // Validation: price must be non-negative
        if let Some(price) = command.price_cents {
            if price < 0 {
                return UseCaseResult::failure(UseCaseError::validation(
                    "PRICE_NEGATIVE",
                    "Course price must not be negative",
                ));
            }
        }

        let currency = match command.currency.as_deref() {
            Some(code) => match Currency::parse(code) {
                Some(c) => c,
                None => {
                    return UseCaseResult::failure(UseCaseError::validation(
                        "CURRENCY_UNSUPPORTED",
                        format!("Unsupported currency: {}", code),
                    ));
                }
            },
            None => Currency::default(),
        };

        // Business rule: slug must be unique
        let mut course = Course::new(title, &ctx.principal_id);
        if course.slug.is_empty() {
            return UseCaseResult::failure(UseCaseError::validation(
                "TITLE_INVALID",
                "Course title must contain at least one alphanumeric character",
            ));
        }

        if let Ok(Some(_)) = self.course_repo.find_by_slug(&course.slug).await {
            // Disambiguate with the tail of the TSID
            let suffix = course.id[course.id.len() - 5..].to_ascii_lowercase();
            course.slug = format!("{}-{}", course.slug, suffix);
        }

        if let Some(ref desc) = command.description {
            course = course.with_description(desc);
        }
        if let Some(ref cid) = command.category_id {
            course = course.with_category_id(cid);
        }
        if let Some(price) = command.price_cents {
            course = course.with_price(price, currency);
        }

        // Create domain event
        let event = CourseCreated::new(&ctx, &course);

        // Atomic commit
        self.unit_of_work.commit(&course, event, &command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = CreateCourseCommand {
            title: "Rust for Beginners".to_string(),
            description: Some("Learn Rust from scratch".to_string()),
            category_id: None,
            price_cents: Some(1999),
            currency: Some("usd".to_string()),
        };

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("Rust for Beginners"));
        assert!(!json.contains("categoryId"));
    }

    #[test]
    fn test_course_has_id() {
        let course = Course::new("Test", "i-1");
        assert!(!HasId::id(&course).is_empty());
        assert_eq!(Course::collection_name(), "courses");
    }
}
