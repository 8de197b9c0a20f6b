//! GraphQL Query and Mutation Roots
//!
//! The public catalog is queryable without a session; everything student-
//! specific requires the auth context threaded in by the handler.

use async_graphql::*;

use crate::course::entity::CourseStatus;
use crate::progress::entity::completion_percent;
use crate::shared::authorization_service::AuthContext;
use super::schema::GraphQLContext;

#[derive(SimpleObject)]
pub struct CourseSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub price_cents: Option<i64>,
    pub currency: String,
}

impl From<crate::Course> for CourseSummary {
    fn from(c: crate::Course) -> Self {
        Self {
            id: c.id,
            title: c.title,
            slug: c.slug,
            description: c.description,
            category_id: c.category_id,
            price_cents: c.price_cents,
            currency: c.currency.code().to_string(),
        }
    }
}

#[derive(SimpleObject)]
pub struct LessonSummary {
    pub id: String,
    pub title: String,
    pub position: u32,
    pub duration_seconds: u32,
    /// Whether the current viewer may play this lesson
    pub playable: bool,
}

#[derive(SimpleObject)]
pub struct ChapterDetail {
    pub id: String,
    pub title: String,
    pub position: u32,
    pub free_preview: bool,
    pub lessons: Vec<LessonSummary>,
}

#[derive(SimpleObject)]
pub struct CourseDetail {
    pub course: CourseSummary,
    pub chapters: Vec<ChapterDetail>,
    /// Whether the viewer holds an active enrollment
    pub enrolled: bool,
}

#[derive(SimpleObject)]
pub struct EnrollmentSummary {
    pub id: String,
    pub course_id: String,
    pub source: String,
    pub created_at: String,
}

#[derive(SimpleObject)]
pub struct CourseProgressSummary {
    pub course_id: String,
    pub completed_lessons: u64,
    pub total_published_lessons: u64,
    pub percent: f64,
}

#[derive(SimpleObject)]
pub struct MessageGql {
    pub id: String,
    pub sender_id: String,
    pub body: String,
    pub read: bool,
    pub created_at: String,
}

#[derive(SimpleObject)]
pub struct ConversationGql {
    pub id: String,
    pub course_id: String,
    pub last_message_at: String,
    pub messages: Vec<MessageGql>,
}

fn require_auth<'a>(ctx: &'a Context<'_>) -> Result<&'a AuthContext> {
    ctx.data_opt::<AuthContext>()
        .ok_or_else(|| Error::new("Authentication required"))
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Published courses, optionally filtered by category and title search
    pub async fn catalog(
        &self,
        ctx: &Context<'_>,
        category_id: Option<String>,
        search: Option<String>,
    ) -> Result<Vec<CourseSummary>> {
        let gql = ctx.data::<GraphQLContext>()?;
        let courses = gql.course_repo
            .find_published(category_id.as_deref(), search.as_deref(), 0, 100)
            .await
            .map_err(|e| Error::new(e.to_string()))?;
        Ok(courses.into_iter().map(|c| c.into()).collect())
    }

    /// A published course with its visible chapter/lesson structure
    pub async fn course(&self, ctx: &Context<'_>, slug: String) -> Result<CourseDetail> {
        let gql = ctx.data::<GraphQLContext>()?;
        let auth = ctx.data_opt::<AuthContext>();

        let course = gql.course_repo
            .find_by_slug(&slug)
            .await
            .map_err(|e| Error::new(e.to_string()))?
            .filter(|c| c.status == CourseStatus::Published)
            .ok_or_else(|| Error::new("Course not found"))?;

        let enrolled = match auth {
            Some(a) => gql.enrollment_repo
                .find_active(&a.principal_id, &course.id)
                .await
                .map_err(|e| Error::new(e.to_string()))?
                .is_some(),
            None => false,
        };

        let chapters = gql.chapter_repo
            .find_published_by_course(&course.id)
            .await
            .map_err(|e| Error::new(e.to_string()))?;

        let mut chapter_details = Vec::with_capacity(chapters.len());
        for chapter in chapters {
            let lessons = gql.lesson_repo
                .find_by_chapter(&chapter.id)
                .await
                .map_err(|e| Error::new(e.to_string()))?;

            let playable_without_enrollment = chapter.free_preview;
            let lesson_summaries = lessons.into_iter()
                .filter(|l| l.is_published())
                .map(|l| LessonSummary {
                    id: l.id,
                    title: l.title,
                    position: l.position,
                    duration_seconds: l.duration_seconds,
                    playable: enrolled || playable_without_enrollment,
                })
                .collect();

            chapter_details.push(ChapterDetail {
                id: chapter.id,
                title: chapter.title,
                position: chapter.position,
                free_preview: chapter.free_preview,
                lessons: lesson_summaries,
            });
        }

        Ok(CourseDetail {
            course: course.into(),
            chapters: chapter_details,
            enrolled,
        })
    }

    /// The viewer's active enrollments
    pub async fn my_enrollments(&self, ctx: &Context<'_>) -> Result<Vec<EnrollmentSummary>> {
        let gql = ctx.data::<GraphQLContext>()?;
        let auth = require_auth(ctx)?;

        let enrollments = gql.enrollment_repo
            .find_by_student(&auth.principal_id)
            .await
            .map_err(|e| Error::new(e.to_string()))?;

        Ok(enrollments.into_iter()
            .map(|e| EnrollmentSummary {
                id: e.id,
                course_id: e.course_id,
                source: format!("{:?}", e.source).to_uppercase(),
                created_at: e.created_at.to_rfc3339(),
            })
            .collect())
    }

    /// The viewer's progress in one course
    pub async fn my_course_progress(
        &self,
        ctx: &Context<'_>,
        course_id: String,
    ) -> Result<CourseProgressSummary> {
        let gql = ctx.data::<GraphQLContext>()?;
        let auth = require_auth(ctx)?;

        let records = gql.progress_repo
            .find_by_student_and_course(&auth.principal_id, &course_id)
            .await
            .map_err(|e| Error::new(e.to_string()))?;
        let total = gql.lesson_repo
            .count_published_by_course(&course_id)
            .await
            .map_err(|e| Error::new(e.to_string()))?;
        let completed = records.iter().filter(|p| p.completed).count() as u64;

        Ok(CourseProgressSummary {
            course_id,
            completed_lessons: completed,
            total_published_lessons: total,
            percent: completion_percent(completed, total),
        })
    }

    /// The viewer's conversation for a course, with its messages
    pub async fn conversation(
        &self,
        ctx: &Context<'_>,
        course_id: String,
    ) -> Result<Option<ConversationGql>> {
        let gql = ctx.data::<GraphQLContext>()?;
        let auth = require_auth(ctx)?;

        let Some(conversation) = gql.conversation_repo
            .find_by_course_and_student(&course_id, &auth.principal_id)
            .await
            .map_err(|e| Error::new(e.to_string()))?
        else {
            return Ok(None);
        };

        if !conversation.is_participant(&auth.principal_id) {
            return Ok(None);
        }

        let messages = gql.message_repo
            .find_by_conversation(&conversation.id, 0, 200)
            .await
            .map_err(|e| Error::new(e.to_string()))?;

        Ok(Some(ConversationGql {
            id: conversation.id,
            course_id: conversation.course_id,
            last_message_at: conversation.last_message_at.to_rfc3339(),
            messages: messages.into_iter()
                .map(|m| MessageGql {
                    id: m.id,
                    sender_id: m.sender_id,
                    body: m.body,
                    read: m.read,
                    created_at: m.created_at.to_rfc3339(),
                })
                .collect(),
        }))
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Send a message in a conversation the viewer participates in
    pub async fn send_message(
        &self,
        ctx: &Context<'_>,
        conversation_id: String,
        body: String,
    ) -> Result<MessageGql> {
        let gql = ctx.data::<GraphQLContext>()?;
        let auth = require_auth(ctx)?;

        let body = body.trim().to_string();
        if body.is_empty() {
            return Err(Error::new("Message body is required"));
        }
        if body.chars().count() > crate::Message::MAX_BODY_CHARS {
            return Err(Error::new("Message body too long"));
        }

        let mut conversation = gql.conversation_repo
            .find_by_id(&conversation_id)
            .await
            .map_err(|e| Error::new(e.to_string()))?
            .ok_or_else(|| Error::new("Conversation not found"))?;

        if !conversation.is_participant(&auth.principal_id) {
            return Err(Error::new("Conversation not found"));
        }

        let message = crate::Message::new(&conversation_id, &auth.principal_id, body);
        gql.message_repo.insert(&message)
            .await
            .map_err(|e| Error::new(e.to_string()))?;

        conversation.touch();
        gql.conversation_repo.update(&conversation)
            .await
            .map_err(|e| Error::new(e.to_string()))?;

        Ok(MessageGql {
            id: message.id,
            sender_id: message.sender_id,
            body: message.body,
            read: message.read,
            created_at: message.created_at.to_rfc3339(),
        })
    }

    /// Mark a lesson complete for the viewer
    pub async fn mark_lesson_complete(
        &self,
        ctx: &Context<'_>,
        lesson_id: String,
    ) -> Result<bool> {
        let gql = ctx.data::<GraphQLContext>()?;
        let auth = require_auth(ctx)?;

        let lesson = gql.lesson_repo
            .find_by_id(&lesson_id)
            .await
            .map_err(|e| Error::new(e.to_string()))?
            .filter(|l| l.is_published())
            .ok_or_else(|| Error::new("Lesson not found"))?;

        let enrolled = gql.enrollment_repo
            .find_active(&auth.principal_id, &lesson.course_id)
            .await
            .map_err(|e| Error::new(e.to_string()))?
            .is_some();
        if !enrolled {
            return Err(Error::new("Not enrolled in this course"));
        }

        let mut progress = match gql.progress_repo
            .find_by_student_and_lesson(&auth.principal_id, &lesson_id)
            .await
            .map_err(|e| Error::new(e.to_string()))?
        {
            Some(p) => p,
            None => {
                let p = crate::LessonProgress::new(&auth.principal_id, &lesson_id, &lesson.course_id);
                gql.progress_repo.insert(&p)
                    .await
                    .map_err(|e| Error::new(e.to_string()))?;
                p
            }
        };

        progress.mark_complete();
        gql.progress_repo.update(&progress)
            .await
            .map_err(|e| Error::new(e.to_string()))?;

        Ok(true)
    }
}
