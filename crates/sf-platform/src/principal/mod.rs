//! Principal Aggregate
//!
//! Local user records backing the hosted identity provider.

pub mod entity;
pub mod repository;
pub mod api;

pub use entity::{Principal, UserScope};
pub use repository::PrincipalRepository;
