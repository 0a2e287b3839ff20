use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use lectern_model::{Content, Module};

use crate::database::infrastructure::memory::{InMemoryCourseRepository, InMemoryPositionStore};
#[cfg(feature = "database")]
use crate::database::infrastructure::postgres::{
    PostgresContentRepository, PostgresCourseRepository, PostgresModuleRepository,
};
use crate::database::ports::{courses::CourseRepository, positions::PositionStore};
use crate::ordering::{content_scope, module_scope};

/// Aggregates the repository ports used by application services.
#[derive(Clone)]
pub struct AppUnitOfWork {
    pub courses: Arc<dyn CourseRepository>,
    pub modules: Arc<dyn PositionStore<Module>>,
    pub contents: Arc<dyn PositionStore<Content>>,
}

impl fmt::Debug for AppUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppUnitOfWork")
            .field("courses", &type_name_of_val(self.courses.as_ref()))
            .field("modules", &type_name_of_val(self.modules.as_ref()))
            .field("contents", &type_name_of_val(self.contents.as_ref()))
            .finish()
    }
}

impl AppUnitOfWork {
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        modules: Arc<dyn PositionStore<Module>>,
        contents: Arc<dyn PositionStore<Content>>,
    ) -> Self {
        Self {
            courses,
            modules,
            contents,
        }
    }

    /// Process-local repositories; state is lost when the process exits.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryCourseRepository::new()),
            Arc::new(InMemoryPositionStore::new(module_scope())),
            Arc::new(InMemoryPositionStore::new(content_scope())),
        )
    }

    #[cfg(feature = "database")]
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self::new(
            Arc::new(PostgresCourseRepository::new(pool.clone())),
            Arc::new(PostgresModuleRepository::new(pool.clone())),
            Arc::new(PostgresContentRepository::new(pool)),
        )
    }
}
