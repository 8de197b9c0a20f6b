//! Domain Event Store
//!
//! Immutable storage for domain events emitted through the UnitOfWork.

pub mod entity;

pub use entity::{Event, ContextData, CLOUDEVENTS_SPEC_VERSION};
