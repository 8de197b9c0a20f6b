//! Revoke Enrollment Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::EnrollmentRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use super::events::EnrollmentRevoked;

/// Command for revoking an enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeEnrollmentCommand {
    pub enrollment_id: String,
}

/// Use case for revoking an enrollment.
///
/// Progress records are kept; only content access is removed.
pub struct RevokeEnrollmentUseCase<U: UnitOfWork> {
    enrollment_repo: Arc<EnrollmentRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> RevokeEnrollmentUseCase<U> {
    pub fn new(enrollment_repo: Arc<EnrollmentRepository>, unit_of_work: Arc<U>) -> Self {
        Self {
            enrollment_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: RevokeEnrollmentCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<EnrollmentRevoked> {
        let mut enrollment = match self.enrollment_repo.find_by_id(&command.enrollment_id).await {
            Ok(Some(e)) => e,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found(
                    "ENROLLMENT_NOT_FOUND",
                    command.enrollment_id.clone(),
                ));
            }
            Err(e) => return UseCaseResult::failure(UseCaseError::commit(e.to_string())),
        };

        if !enrollment.is_active() {
            return UseCaseResult::failure(UseCaseError::business_rule(
                "ALREADY_REVOKED",
                "Enrollment is already revoked",
            ));
        }

        enrollment.revoke();

        let event = EnrollmentRevoked::new(&ctx, &enrollment);
        self.unit_of_work.commit(&enrollment, event, &command).await
    }
}
