use chrono::{DateTime, Utc};

use crate::course::required;
use crate::error::Result;
use crate::ids::{CourseId, ModuleId};
use crate::position::Position;

/// An ordered section of a course.
///
/// `position` is `None` only while the module is pending persistence and no
/// explicit value was requested; storage always holds a concrete value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Module {
    pub id: ModuleId,
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    pub position: Option<Position>,
    pub created_at: DateTime<Utc>,
}

impl Module {
    pub fn new(course_id: CourseId, draft: ModuleDraft) -> Result<Self> {
        Ok(Self {
            id: ModuleId::new(),
            course_id,
            title: required("title", draft.title)?,
            description: draft.description,
            position: draft.position,
            created_at: Utc::now(),
        })
    }

    /// Update title and description. Position is owned by the sequencer and
    /// is deliberately not part of this edit.
    pub fn apply(&mut self, title: String, description: String) -> Result<()> {
        self.title = required("title", title)?;
        self.description = description;
        Ok(())
    }
}

/// Fields accepted when creating a module.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModuleDraft {
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub position: Option<Position>,
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(position) => write!(f, "{position}. {}", self.title),
            None => write!(f, "{}", self.title),
        }
    }
}
