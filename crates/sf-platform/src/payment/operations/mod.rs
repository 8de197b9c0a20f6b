//! Payment Operations
//!
//! Webhook-driven checkout fulfillment through the UnitOfWork.

pub mod events;
pub mod fulfill;

pub use events::CheckoutCompleted;
pub use fulfill::{FulfillCheckoutCommand, FulfillCheckoutUseCase};
