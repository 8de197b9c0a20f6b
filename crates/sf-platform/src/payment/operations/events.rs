//! Payment Domain Events

use serde::{Deserialize, Serialize};
use crate::usecase::ExecutionContext;
use crate::usecase::domain_event::EventMetadata;
use crate::TsidGenerator;
use crate::impl_domain_event;

const SPEC_VERSION: &str = "1.0";
const SOURCE: &str = "lms:commerce";

/// Event emitted when a checkout completes and the enrollment is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutCompleted {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub checkout_id: String,
    pub processor_session_id: String,
    pub course_id: String,
    pub student_id: String,
    pub enrollment_id: String,
    pub amount_cents: i64,
    pub currency: String,
}

impl_domain_event!(CheckoutCompleted);

impl CheckoutCompleted {
    const EVENT_TYPE: &'static str = "lms:commerce:checkout:completed";

    pub fn new(
        ctx: &ExecutionContext,
        checkout: &crate::CheckoutSession,
        enrollment_id: &str,
    ) -> Self {
        let subject = format!("commerce.checkout.{}", checkout.id);
        let message_group = format!("commerce:checkout:{}", checkout.id);

        Self {
            metadata: EventMetadata::new(
                TsidGenerator::generate(),
                Self::EVENT_TYPE,
                SPEC_VERSION,
                SOURCE,
                subject,
                message_group,
                ctx.execution_id.clone(),
                ctx.correlation_id.clone(),
                ctx.causation_id.clone(),
                ctx.principal_id.clone(),
            ),
            checkout_id: checkout.id.clone(),
            processor_session_id: checkout.processor_session_id.clone(),
            course_id: checkout.course_id.clone(),
            student_id: checkout.student_id.clone(),
            enrollment_id: enrollment_id.to_string(),
            amount_cents: checkout.amount_cents,
            currency: checkout.currency.code().to_string(),
        }
    }
}
