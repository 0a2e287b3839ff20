//! Read models assembled by [`super::CourseService`] for course pages.

use lectern_model::{Content, ContentId, ContentKind, Course, Module, Position, UserId};
use serde::Serialize;

/// A content slot together with its rendered HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedContent {
    pub id: ContentId,
    pub position: Option<Position>,
    pub kind: ContentKind,
    pub title: String,
    pub owner: UserId,
    pub html: String,
}

impl From<&Content> for RenderedContent {
    fn from(content: &Content) -> Self {
        Self {
            id: content.id,
            position: content.position,
            kind: content.item.kind(),
            title: content.item.title().to_string(),
            owner: content.item.owner(),
            html: content.item.render(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleWithContents {
    #[serde(flatten)]
    pub module: Module,
    pub contents: Vec<RenderedContent>,
}

/// Everything an enrolled student sees for one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseWithContents {
    pub course: Course,
    pub modules: Vec<ModuleWithContents>,
}

/// Course navigation plus the module currently being studied. `current` is
/// `None` only when the course has no modules yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentCourseView {
    pub course: Course,
    pub modules: Vec<Module>,
    pub current: Option<ModuleWithContents>,
}
