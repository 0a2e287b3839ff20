use std::sync::Arc;

use async_trait::async_trait;
use lectern_model::{CourseId, Module, ModuleId, UserId};

use crate::database::ports::{courses::CourseRepository, positions::PositionStore};
use crate::error::Result;
use crate::ordering::ScopeOwnership;

/// A course scope belongs to the course's author.
#[derive(Clone)]
pub struct CourseOwnership {
    courses: Arc<dyn CourseRepository>,
}

impl CourseOwnership {
    pub fn new(courses: Arc<dyn CourseRepository>) -> Self {
        Self { courses }
    }
}

#[async_trait]
impl ScopeOwnership<CourseId> for CourseOwnership {
    async fn is_owned_by(&self, scope: &CourseId, actor: UserId) -> Result<bool> {
        Ok(self
            .courses
            .get_course(*scope)
            .await?
            .is_some_and(|course| course.is_owned_by(actor)))
    }
}

/// A module scope belongs to the author of the module's course.
#[derive(Clone)]
pub struct ModuleOwnership {
    modules: Arc<dyn PositionStore<Module>>,
    courses: CourseOwnership,
}

impl ModuleOwnership {
    pub fn new(
        modules: Arc<dyn PositionStore<Module>>,
        courses: Arc<dyn CourseRepository>,
    ) -> Self {
        Self {
            modules,
            courses: CourseOwnership::new(courses),
        }
    }
}

#[async_trait]
impl ScopeOwnership<ModuleId> for ModuleOwnership {
    async fn is_owned_by(&self, scope: &ModuleId, actor: UserId) -> Result<bool> {
        match self.modules.find(*scope).await? {
            Some(module) => self.courses.is_owned_by(&module.course_id, actor).await,
            None => Ok(false),
        }
    }
}
