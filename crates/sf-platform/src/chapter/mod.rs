//! Chapter Aggregate

pub mod entity;
pub mod repository;
pub mod api;

pub use entity::{Chapter, ChapterStatus};
pub use repository::ChapterRepository;
