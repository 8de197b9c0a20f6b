//! Conversations API
//!
//! Course-scoped messaging between students and instructors.

use axum::{
    extract::{State, Path, Query},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::{ToSchema, IntoParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::message::entity::{Conversation, Message};
use crate::{
    ConversationRepository, CourseRepository, EnrollmentRepository, MessageRepository,
    PrincipalRepository,
};
use crate::shared::api_common::{PaginationParams, SuccessResponse};
use crate::shared::error::PlatformError;
use crate::shared::mailer::Mailer;
use crate::shared::middleware::Authenticated;

/// Conversation response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: String,
    pub course_id: String,
    pub student_id: String,
    pub instructor_id: String,
    pub last_message_at: String,
    pub unread_count: u64,
}

/// Conversation list response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationResponse>,
}

/// Message response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub body: String,
    pub read: bool,
    pub created_at: String,
}

impl From<Message> for MessageResponse {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            conversation_id: m.conversation_id,
            sender_id: m.sender_id,
            body: m.body,
            read: m.read,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Message list response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageListResponse {
    pub messages: Vec<MessageResponse>,
    pub total: u64,
}

/// Start conversation request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartConversationRequest {
    pub course_id: String,
}

/// Send message request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub body: String,
}

/// Query for message listing
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MessagesQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Conversations service state
#[derive(Clone)]
pub struct ConversationsState {
    pub conversation_repo: Arc<ConversationRepository>,
    pub message_repo: Arc<MessageRepository>,
    pub course_repo: Arc<CourseRepository>,
    pub enrollment_repo: Arc<EnrollmentRepository>,
    pub principal_repo: Arc<PrincipalRepository>,
    pub mailer: Arc<Mailer>,
}

async fn conversation_for_participant(
    state: &ConversationsState,
    id: &str,
    principal_id: &str,
) -> Result<Conversation, PlatformError> {
    let conversation = state.conversation_repo.find_by_id(id).await?
        .ok_or_else(|| PlatformError::not_found("Conversation", id))?;

    if !conversation.is_participant(principal_id) {
        // Hide existence from non-participants
        return Err(PlatformError::not_found("Conversation", id));
    }

    Ok(conversation)
}

/// Start (or fetch) the conversation for a course
///
/// Students open conversations with the course instructor. An existing
/// conversation is returned as-is.
#[utoipa::path(
    post,
    path = "",
    tag = "conversations",
    operation_id = "postApiConversations",
    request_body = StartConversationRequest,
    responses(
        (status = 200, description = "Conversation", body = ConversationResponse),
        (status = 403, description = "Not enrolled in course")
    ),
    security(("bearer_auth" = []))
)]
pub async fn start_conversation(
    State(state): State<ConversationsState>,
    auth: Authenticated,
    Json(req): Json<StartConversationRequest>,
) -> Result<Json<ConversationResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_send_messages(&auth.0)?;

    let course = state.course_repo.find_by_id(&req.course_id).await?
        .ok_or_else(|| PlatformError::CourseNotFound { id: req.course_id.clone() })?;

    // Students must hold an active enrollment to message the instructor
    if course.instructor_id != auth.0.principal_id {
        let enrolled = state.enrollment_repo
            .find_active(&auth.0.principal_id, &req.course_id)
            .await?
            .is_some();
        if !enrolled {
            return Err(PlatformError::NotEnrolled { course_id: req.course_id });
        }
    }

    let conversation = match state.conversation_repo
        .find_by_course_and_student(&req.course_id, &auth.0.principal_id)
        .await?
    {
        Some(c) => c,
        None => {
            if course.instructor_id == auth.0.principal_id {
                return Err(PlatformError::validation(
                    "Instructors reply to student conversations rather than starting their own",
                ));
            }
            let c = Conversation::new(&req.course_id, &auth.0.principal_id, &course.instructor_id);
            state.conversation_repo.insert(&c).await?;
            c
        }
    };

    let unread = state.message_repo.count_unread(&conversation.id, &auth.0.principal_id).await?;
    Ok(Json(ConversationResponse {
        id: conversation.id,
        course_id: conversation.course_id,
        student_id: conversation.student_id,
        instructor_id: conversation.instructor_id,
        last_message_at: conversation.last_message_at.to_rfc3339(),
        unread_count: unread,
    }))
}

/// List the caller's conversations, newest activity first
#[utoipa::path(
    get,
    path = "",
    tag = "conversations",
    operation_id = "getApiConversations",
    responses(
        (status = 200, description = "List of conversations", body = ConversationListResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_conversations(
    State(state): State<ConversationsState>,
    auth: Authenticated,
) -> Result<Json<ConversationListResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_read_conversations(&auth.0)?;

    let conversations = state.conversation_repo.find_by_participant(&auth.0.principal_id).await?;

    let mut responses = Vec::with_capacity(conversations.len());
    for c in conversations {
        let unread = state.message_repo.count_unread(&c.id, &auth.0.principal_id).await?;
        responses.push(ConversationResponse {
            id: c.id,
            course_id: c.course_id,
            student_id: c.student_id,
            instructor_id: c.instructor_id,
            last_message_at: c.last_message_at.to_rfc3339(),
            unread_count: unread,
        });
    }

    Ok(Json(ConversationListResponse { conversations: responses }))
}

/// List messages in a conversation, oldest first
#[utoipa::path(
    get,
    path = "/{id}/messages",
    tag = "conversations",
    operation_id = "getApiConversationsByIdMessages",
    params(
        ("id" = String, Path, description = "Conversation ID"),
        MessagesQuery
    ),
    responses(
        (status = 200, description = "Messages", body = MessageListResponse),
        (status = 404, description = "Conversation not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_messages(
    State(state): State<ConversationsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<MessageListResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_read_conversations(&auth.0)?;
    conversation_for_participant(&state, &id, &auth.0.principal_id).await?;

    let messages = state.message_repo.find_by_conversation(
        &id,
        query.pagination.offset(),
        query.pagination.limit(),
    ).await?;
    let total = state.message_repo.count_by_conversation(&id).await?;

    Ok(Json(MessageListResponse {
        messages: messages.into_iter().map(|m| m.into()).collect(),
        total,
    }))
}

/// Send a message
#[utoipa::path(
    post,
    path = "/{id}/messages",
    tag = "conversations",
    operation_id = "postApiConversationsByIdMessages",
    params(
        ("id" = String, Path, description = "Conversation ID")
    ),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = MessageResponse),
        (status = 404, description = "Conversation not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn send_message(
    State(state): State<ConversationsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<MessageResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_send_messages(&auth.0)?;
    let mut conversation = conversation_for_participant(&state, &id, &auth.0.principal_id).await?;

    let body = req.body.trim();
    if body.is_empty() {
        return Err(PlatformError::validation("Message body is required"));
    }
    if body.chars().count() > Message::MAX_BODY_CHARS {
        return Err(PlatformError::validation(format!(
            "Message body exceeds {} characters", Message::MAX_BODY_CHARS
        )));
    }

    let message = Message::new(&id, &auth.0.principal_id, body);
    state.message_repo.insert(&message).await?;

    conversation.touch();
    state.conversation_repo.update(&conversation).await?;

    metrics::counter!("sf_messages_sent_total").increment(1);

    // Best-effort email notification to the counterpart
    if let Some(recipient_id) = conversation.counterpart(&auth.0.principal_id) {
        if let Ok(Some(recipient)) = state.principal_repo.find_by_id(recipient_id).await {
            let course_title = state.course_repo
                .find_by_id(&conversation.course_id)
                .await
                .ok()
                .flatten()
                .map(|c| c.title)
                .unwrap_or_else(|| "your course".to_string());

            let mailer = state.mailer.clone();
            let sender_name = auth.0.name.clone();
            tokio::spawn(async move {
                mailer.send_message_notification(&recipient.email, &course_title, &sender_name).await;
            });
        }
    }

    Ok(Json(message.into()))
}

/// Mark the conversation read for the caller
#[utoipa::path(
    post,
    path = "/{id}/read",
    tag = "conversations",
    operation_id = "postApiConversationsByIdRead",
    params(
        ("id" = String, Path, description = "Conversation ID")
    ),
    responses(
        (status = 200, description = "Conversation marked read", body = SuccessResponse),
        (status = 404, description = "Conversation not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_read(
    State(state): State<ConversationsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_read_conversations(&auth.0)?;
    conversation_for_participant(&state, &id, &auth.0.principal_id).await?;

    state.message_repo.mark_read(&id, &auth.0.principal_id).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Create conversations router
pub fn conversations_router(state: ConversationsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(start_conversation, list_conversations))
        .routes(routes!(list_messages, send_message))
        .routes(routes!(mark_read))
        .with_state(state)
}
