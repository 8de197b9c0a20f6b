//! GraphQL Schema Construction

use std::sync::Arc;

use async_graphql::{EmptySubscription, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{extract::State, routing::post, Router};

use super::types::{MutationRoot, QueryRoot};
use crate::shared::middleware::OptionalAuth;
use crate::{
    ChapterRepository, ConversationRepository, CourseRepository, EnrollmentRepository,
    LessonRepository, MessageRepository, ProgressRepository,
};

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Shared repository handles for GraphQL resolvers
#[derive(Clone)]
pub struct GraphQLContext {
    pub course_repo: Arc<CourseRepository>,
    pub chapter_repo: Arc<ChapterRepository>,
    pub lesson_repo: Arc<LessonRepository>,
    pub enrollment_repo: Arc<EnrollmentRepository>,
    pub progress_repo: Arc<ProgressRepository>,
    pub conversation_repo: Arc<ConversationRepository>,
    pub message_repo: Arc<MessageRepository>,
}

pub fn build_schema(context: GraphQLContext) -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(context)
        .finish()
}

/// Axum handler: threads the session's auth context into the request data
async fn graphql_handler(
    State(schema): State<AppSchema>,
    auth: OptionalAuth,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(ctx) = auth.0 {
        request = request.data(ctx);
    }
    schema.execute(request).await.into()
}

/// Create the GraphQL router
pub fn graphql_router(schema: AppSchema) -> Router {
    Router::new()
        .route("/", post(graphql_handler))
        .with_state(schema)
}
