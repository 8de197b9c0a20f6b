//! Course Domain Events

use serde::{Deserialize, Serialize};
use crate::usecase::ExecutionContext;
use crate::usecase::domain_event::EventMetadata;
use crate::TsidGenerator;
use crate::impl_domain_event;

const SPEC_VERSION: &str = "1.0";
const SOURCE: &str = "lms:catalog";

fn course_subject(course_id: &str) -> String {
    format!("catalog.course.{}", course_id)
}

fn course_group(course_id: &str) -> String {
    format!("catalog:course:{}", course_id)
}

/// Event emitted when a new course is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseCreated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub course_id: String,
    pub title: String,
    pub slug: String,
    pub instructor_id: String,
}

impl_domain_event!(CourseCreated);

impl CourseCreated {
    const EVENT_TYPE: &'static str = "lms:catalog:course:created";

    pub fn new(ctx: &ExecutionContext, course: &crate::Course) -> Self {
        Self {
            metadata: EventMetadata::new(
                TsidGenerator::generate(),
                Self::EVENT_TYPE,
                SPEC_VERSION,
                SOURCE,
                course_subject(&course.id),
                course_group(&course.id),
                ctx.execution_id.clone(),
                ctx.correlation_id.clone(),
                ctx.causation_id.clone(),
                ctx.principal_id.clone(),
            ),
            course_id: course.id.clone(),
            title: course.title.clone(),
            slug: course.slug.clone(),
            instructor_id: course.instructor_id.clone(),
        }
    }
}

/// Event emitted when course fields are updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub course_id: String,
    pub title: String,
}

impl_domain_event!(CourseUpdated);

impl CourseUpdated {
    const EVENT_TYPE: &'static str = "lms:catalog:course:updated";

    pub fn new(ctx: &ExecutionContext, course: &crate::Course) -> Self {
        Self {
            metadata: EventMetadata::new(
                TsidGenerator::generate(),
                Self::EVENT_TYPE,
                SPEC_VERSION,
                SOURCE,
                course_subject(&course.id),
                course_group(&course.id),
                ctx.execution_id.clone(),
                ctx.correlation_id.clone(),
                ctx.causation_id.clone(),
                ctx.principal_id.clone(),
            ),
            course_id: course.id.clone(),
            title: course.title.clone(),
        }
    }
}

/// Event emitted when a course goes live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePublished {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub course_id: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,
}

impl_domain_event!(CoursePublished);

impl CoursePublished {
    const EVENT_TYPE: &'static str = "lms:catalog:course:published";

    pub fn new(ctx: &ExecutionContext, course: &crate::Course) -> Self {
        Self {
            metadata: EventMetadata::new(
                TsidGenerator::generate(),
                Self::EVENT_TYPE,
                SPEC_VERSION,
                SOURCE,
                course_subject(&course.id),
                course_group(&course.id),
                ctx.execution_id.clone(),
                ctx.correlation_id.clone(),
                ctx.causation_id.clone(),
                ctx.principal_id.clone(),
            ),
            course_id: course.id.clone(),
            slug: course.slug.clone(),
            price_cents: course.price_cents,
        }
    }
}

/// Event emitted when a course is taken offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseUnpublished {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub course_id: String,
}

impl_domain_event!(CourseUnpublished);

impl CourseUnpublished {
    const EVENT_TYPE: &'static str = "lms:catalog:course:unpublished";

    pub fn new(ctx: &ExecutionContext, course_id: &str) -> Self {
        Self {
            metadata: EventMetadata::new(
                TsidGenerator::generate(),
                Self::EVENT_TYPE,
                SPEC_VERSION,
                SOURCE,
                course_subject(course_id),
                course_group(course_id),
                ctx.execution_id.clone(),
                ctx.correlation_id.clone(),
                ctx.causation_id.clone(),
                ctx.principal_id.clone(),
            ),
            course_id: course_id.to_string(),
        }
    }
}

/// Event emitted when a course is archived.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseArchived {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub course_id: String,
}

impl_domain_event!(CourseArchived);

impl CourseArchived {
    const EVENT_TYPE: &'static str = "lms:catalog:course:archived";

    pub fn new(ctx: &ExecutionContext, course_id: &str) -> Self {
        Self {
            metadata: EventMetadata::new(
                TsidGenerator::generate(),
                Self::EVENT_TYPE,
                SPEC_VERSION,
                SOURCE,
                course_subject(course_id),
                course_group(course_id),
                ctx.execution_id.clone(),
                ctx.correlation_id.clone(),
                ctx.causation_id.clone(),
                ctx.principal_id.clone(),
            ),
            course_id: course_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::DomainEvent;
    use crate::Course;

    #[test]
    fn test_course_created_event() {
        let ctx = ExecutionContext::create("instructor-1");
        let course = Course::new("Rust for Beginners", "instructor-1");
        let event = CourseCreated::new(&ctx, &course);

        assert_eq!(event.event_type(), "lms:catalog:course:created");
        assert_eq!(event.subject(), format!("catalog.course.{}", course.id));
        assert_eq!(event.slug, "rust-for-beginners");
    }

    #[test]
    fn test_course_published_event_carries_price() {
        let ctx = ExecutionContext::create("instructor-1");
        let course = Course::new("Rust", "instructor-1")
            .with_price(1999, sf_common::Currency::Usd);
        let event = CoursePublished::new(&ctx, &course);

        assert_eq!(event.event_type(), "lms:catalog:course:published");
        assert_eq!(event.price_cents, Some(1999));
    }
}
