//! Fulfill Checkout Use Case
//!
//! Driven by the `checkout.session.completed` webhook. Marks the local
//! checkout record completed and creates the purchase enrollment in one
//! atomic commit. Replayed webhooks are detected and rejected before any
//! state is touched, so fulfillment is idempotent.

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::enrollment::entity::{Enrollment, EnrollmentSource};
use crate::payment::entity::CheckoutSession;
use crate::{CheckoutRepository, EnrollmentRepository};
use crate::usecase::{
    ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult,
    unit_of_work::{AggregateRef, HasId, SerializableAggregate},
};
use super::events::CheckoutCompleted;

impl HasId for CheckoutSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        "checkout_sessions"
    }
}

/// Command carrying the webhook's session reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillCheckoutCommand {
    pub processor_session_id: String,
}

/// Use case for fulfilling a completed checkout.
pub struct FulfillCheckoutUseCase<U: UnitOfWork> {
    checkout_repo: Arc<CheckoutRepository>,
    enrollment_repo: Arc<EnrollmentRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> FulfillCheckoutUseCase<U> {
    pub fn new(
        checkout_repo: Arc<CheckoutRepository>,
        enrollment_repo: Arc<EnrollmentRepository>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            checkout_repo,
            enrollment_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: FulfillCheckoutCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<CheckoutCompleted> {
        let mut checkout = match self.checkout_repo
            .find_by_processor_session(&command.processor_session_id)
            .await
        {
            Ok(Some(c)) => c,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found(
                    "CHECKOUT_NOT_FOUND",
                    command.processor_session_id.clone(),
                ));
            }
            Err(e) => return UseCaseResult::failure(UseCaseError::commit(e.to_string())),
        };

        // Idempotency: replayed events must not create duplicate enrollments
        if !checkout.is_pending() {
            return UseCaseResult::failure(UseCaseError::business_rule(
                "ALREADY_FULFILLED",
                "Checkout session was already processed",
            ));
        }
        match self.enrollment_repo.find_by_checkout(&checkout.id).await {
            Ok(Some(_)) => {
                return UseCaseResult::failure(UseCaseError::business_rule(
                    "ALREADY_FULFILLED",
                    "Enrollment already exists for this checkout",
                ));
            }
            Ok(None) => {}
            Err(e) => return UseCaseResult::failure(UseCaseError::commit(e.to_string())),
        }

        checkout.complete();

        let enrollment = Enrollment::new(
            &checkout.course_id,
            &checkout.student_id,
            EnrollmentSource::Purchase,
        )
        .with_checkout_id(&checkout.id);

        // The webhook runs as the system on behalf of the buyer
        let ctx = ctx.with_principal(&checkout.student_id);
        let event = CheckoutCompleted::new(&ctx, &checkout, &enrollment.id);

        let aggregates: Vec<Box<dyn SerializableAggregate>> = vec![
            Box::new(AggregateRef(checkout)),
            Box::new(AggregateRef(enrollment)),
        ];

        self.unit_of_work.commit_all(aggregates, event, &command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_common::Currency;

    #[test]
    fn test_checkout_has_id() {
        let checkout = CheckoutSession::new("c-1", "s-1", "cs_1", 1999, Currency::Usd);
        assert!(!HasId::id(&checkout).is_empty());
        assert_eq!(CheckoutSession::collection_name(), "checkout_sessions");
    }
}
