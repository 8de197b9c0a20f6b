//! Enrollment Operations
//!
//! Use cases for enrollment lifecycle with guaranteed event emission and
//! audit logging through UnitOfWork.

pub mod events;
pub mod enroll;
pub mod revoke;

// Re-export events
pub use events::{EnrollmentCreated, EnrollmentRevoked};

// Re-export commands and use cases
pub use enroll::{EnrollCommand, EnrollUseCase};
pub use revoke::{RevokeEnrollmentCommand, RevokeEnrollmentUseCase};
