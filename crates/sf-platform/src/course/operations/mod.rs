//! Course Operations
//!
//! Use cases for course lifecycle following the Command pattern
//! with guaranteed event emission and audit logging through UnitOfWork.

pub mod events;
pub mod create;
pub mod update;
pub mod publish;
pub mod unpublish;
pub mod archive;

// Re-export events
pub use events::{
    CourseCreated,
    CourseUpdated,
    CoursePublished,
    CourseUnpublished,
    CourseArchived,
};

// Re-export commands and use cases
pub use create::{CreateCourseCommand, CreateCourseUseCase};
pub use update::{UpdateCourseCommand, UpdateCourseUseCase};
pub use publish::{PublishCourseCommand, PublishCourseUseCase};
pub use unpublish::{UnpublishCourseCommand, UnpublishCourseUseCase};
pub use archive::{ArchiveCourseCommand, ArchiveCourseUseCase};
