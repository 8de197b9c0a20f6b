//! Payments API
//!
//! Checkout creation and the processor webhook endpoint.

use axum::{
    extract::{State, Path},
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use sf_common::Money;

use crate::payment::client::PaymentClient;
use crate::payment::entity::CheckoutSession;
use crate::payment::operations::{FulfillCheckoutCommand, FulfillCheckoutUseCase};
use crate::payment::webhook::{verify_signature, DEFAULT_TOLERANCE_SECS};
use crate::{
    CheckoutRepository, CourseRepository, EnrollmentRepository, PrincipalRepository,
};
use crate::shared::error::PlatformError;
use crate::shared::mailer::Mailer;
use crate::shared::middleware::Authenticated;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseResult};

/// Checkout creation response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub checkout_id: String,
    /// Redirect the buyer here to pay
    pub redirect_url: String,
}

/// Webhook acknowledgement
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub received: bool,
}

/// Incoming webhook event envelope (Stripe-style)
#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(default)]
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: WebhookData,
}

#[derive(Debug, Deserialize)]
struct WebhookData {
    object: WebhookObject,
}

#[derive(Debug, Deserialize)]
struct WebhookObject {
    id: String,
}

/// Payments service state
#[derive(Clone)]
pub struct PaymentsState<U: UnitOfWork + 'static> {
    pub checkout_repo: Arc<CheckoutRepository>,
    pub course_repo: Arc<CourseRepository>,
    pub enrollment_repo: Arc<EnrollmentRepository>,
    pub principal_repo: Arc<PrincipalRepository>,
    pub payment_client: Option<Arc<PaymentClient>>,
    pub fulfill_use_case: Arc<FulfillCheckoutUseCase<U>>,
    pub mailer: Arc<Mailer>,
    pub webhook_secret: String,
}

/// Create a checkout session for a paid course
#[utoipa::path(
    post,
    path = "/courses/{course_id}/checkout",
    tag = "payments",
    operation_id = "postApiCoursesByCourseIdCheckout",
    params(
        ("course_id" = String, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutResponse),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Already enrolled or course is free")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_checkout<U: UnitOfWork>(
    State(state): State<PaymentsState<U>>,
    auth: Authenticated,
    Path(course_id): Path<String>,
) -> Result<Json<CheckoutResponse>, PlatformError> {
    crate::shared::authorization_service::checks::can_create_checkout(&auth.0)?;

    let Some(client) = &state.payment_client else {
        return Err(PlatformError::payment("Payments are not configured"));
    };

    let course = state.course_repo.find_by_id(&course_id).await?
        .ok_or_else(|| PlatformError::CourseNotFound { id: course_id.clone() })?;

    if !course.is_published() {
        return Err(PlatformError::CourseNotFound { id: course_id });
    }
    if course.is_free() {
        return Err(PlatformError::validation("Free courses do not require checkout"));
    }
    if state.enrollment_repo.find_active(&auth.0.principal_id, &course_id).await?.is_some() {
        return Err(PlatformError::duplicate("Enrollment", "course", course_id));
    }

    let price_id = course.payment_price_id.clone()
        .ok_or_else(|| PlatformError::payment("Course has no processor price; republish it"))?;

    let redirect = client
        .create_checkout_session(&price_id, &course.id, &auth.0.principal_id)
        .await?;

    let session = CheckoutSession::new(
        &course.id,
        &auth.0.principal_id,
        &redirect.session_id,
        course.price_cents.unwrap_or(0),
        course.currency,
    );
    state.checkout_repo.insert(&session).await?;

    metrics::counter!("sf_checkouts_created_total").increment(1);
    info!(checkout_id = %session.id, course_id = %course.id, "Checkout session created");

    Ok(Json(CheckoutResponse {
        checkout_id: session.id,
        redirect_url: redirect.url,
    }))
}

/// Processor webhook endpoint
///
/// Verifies the signature header before touching any state. Replayed
/// events are acknowledged without side effects.
#[utoipa::path(
    post,
    path = "/payments/webhook",
    tag = "payments",
    operation_id = "postApiPaymentsWebhook",
    responses(
        (status = 200, description = "Event processed", body = WebhookAck),
        (status = 400, description = "Invalid signature or payload")
    )
)]
pub async fn webhook<U: UnitOfWork>(
    State(state): State<PaymentsState<U>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookAck>, PlatformError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| PlatformError::WebhookSignature {
            message: "Missing signature header".to_string(),
        })?;

    verify_signature(
        body.as_bytes(),
        signature,
        &state.webhook_secret,
        DEFAULT_TOLERANCE_SECS,
        chrono::Utc::now().timestamp(),
    )?;

    let event: WebhookEvent = serde_json::from_str(&body)
        .map_err(|e| PlatformError::validation(format!("Invalid webhook payload: {}", e)))?;

    match event.event_type.as_str() {
        "checkout.session.completed" => {
            let command = FulfillCheckoutCommand {
                processor_session_id: event.data.object.id.clone(),
            };
            let ctx = ExecutionContext::with_correlation("system", &event.id);

            match state.fulfill_use_case.execute(command, ctx).await {
                UseCaseResult::Success(completed) => {
                    metrics::counter!("sf_checkouts_completed_total").increment(1);
                    info!(
                        checkout_id = %completed.checkout_id,
                        enrollment_id = %completed.enrollment_id,
                        "Checkout fulfilled"
                    );

                    send_receipt(&state, &completed.student_id, &completed.course_id,
                                 completed.amount_cents).await;
                }
                // Replays acknowledge cleanly; everything else is an error
                UseCaseResult::Failure(err) if err.code() == "ALREADY_FULFILLED" => {
                    info!(session_id = %event.data.object.id, "Webhook replay ignored");
                }
                UseCaseResult::Failure(err) => return Err(err.into()),
            }
        }
        "checkout.session.expired" => {
            expire_session(&state, &event.data.object.id).await?;
        }
        other => {
            // Unknown event types are acknowledged so the processor
            // stops retrying them.
            warn!(event_type = %other, "Unhandled webhook event type");
        }
    }

    Ok(Json(WebhookAck { received: true }))
}

async fn expire_session<U: UnitOfWork>(
    state: &PaymentsState<U>,
    processor_session_id: &str,
) -> Result<(), PlatformError> {
    let Some(mut session) = state.checkout_repo
        .find_by_processor_session(processor_session_id)
        .await?
    else {
        warn!(session_id = %processor_session_id, "Expiry for unknown checkout session");
        return Ok(());
    };

    if session.is_pending() {
        session.expire();
        state.checkout_repo.update(&session).await?;
        info!(checkout_id = %session.id, "Checkout session expired");
    }

    Ok(())
}

async fn send_receipt<U: UnitOfWork>(
    state: &PaymentsState<U>,
    student_id: &str,
    course_id: &str,
    amount_cents: i64,
) {
    let Ok(Some(student)) = state.principal_repo.find_by_id(student_id).await else {
        return;
    };
    let Ok(Some(course)) = state.course_repo.find_by_id(course_id).await else {
        return;
    };

    let amount = Money::new(amount_cents, course.currency).display();
    let mailer = state.mailer.clone();
    tokio::spawn(async move {
        mailer.send_purchase_receipt(&student.email, &course.title, &amount).await;
    });
}

/// Create payments router (mounted under /api)
pub fn payments_router<U: UnitOfWork + Clone>(state: PaymentsState<U>) -> Router {
    Router::new()
        .route("/courses/:course_id/checkout", post(create_checkout::<U>))
        .route("/payments/webhook", post(webhook::<U>))
        .with_state(state)
}
