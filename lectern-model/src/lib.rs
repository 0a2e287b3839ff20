//! Core data model definitions shared across Lectern crates.
#![allow(missing_docs)]

pub use ::chrono;

pub mod content;
pub mod course;
pub mod error;
pub mod ids;
pub mod module;
pub mod position;

// Intentionally curated re-exports for downstream consumers.
pub use content::{
    Content, ContentItem, ContentKind, FileItem, ImageItem, ItemFields,
    ItemMeta, TextItem, VideoItem,
};
pub use course::{Course, CourseDraft, Subject, SubjectSummary};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{ContentId, CourseId, ModuleId, SubjectId, UserId};
pub use module::{Module, ModuleDraft};
pub use position::Position;
