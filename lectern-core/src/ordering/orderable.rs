use std::{
    fmt::{self, Debug, Display},
    hash::Hash,
    str::FromStr,
    sync::Arc,
};

use chrono::{DateTime, Utc};
use lectern_model::{Content, ContentId, CourseId, Module, ModuleId, Position};

/// An entity that carries a position among the siblings of its scope.
pub trait Orderable: Clone + Debug + Send + Sync + 'static {
    type Id: Copy + Eq + Ord + Hash + Display + FromStr + Debug + Send + Sync + 'static;
    type Scope: Clone + Eq + Hash + Display + Debug + Send + Sync + 'static;

    /// Short noun used in logs and error messages.
    const KIND: &'static str;

    fn id(&self) -> Self::Id;
    fn position(&self) -> Option<Position>;
    fn set_position(&mut self, position: Position);

    /// Secondary sort key for entities sharing a position.
    fn created_at(&self) -> DateTime<Utc>;
}

/// Strategy extracting the scope an entity is sequenced within.
///
/// Scopes spanning several sibling fields are expressed as tuple scopes.
pub struct ScopeKey<E: Orderable> {
    name: &'static str,
    extract: Arc<dyn Fn(&E) -> E::Scope + Send + Sync>,
}

impl<E: Orderable> ScopeKey<E> {
    pub fn new<F>(name: &'static str, extract: F) -> Self
    where
        F: Fn(&E) -> E::Scope + Send + Sync + 'static,
    {
        Self {
            name,
            extract: Arc::new(extract),
        }
    }

    pub fn of(&self, entity: &E) -> E::Scope {
        (self.extract)(entity)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<E: Orderable> Clone for ScopeKey<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            extract: Arc::clone(&self.extract),
        }
    }
}

impl<E: Orderable> fmt::Debug for ScopeKey<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeKey")
            .field("kind", &E::KIND)
            .field("name", &self.name)
            .finish()
    }
}

impl Orderable for Module {
    type Id = ModuleId;
    type Scope = CourseId;

    const KIND: &'static str = "module";

    fn id(&self) -> ModuleId {
        self.id
    }

    fn position(&self) -> Option<Position> {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = Some(position);
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Orderable for Content {
    type Id = ContentId;
    type Scope = ModuleId;

    const KIND: &'static str = "content";

    fn id(&self) -> ContentId {
        self.id
    }

    fn position(&self) -> Option<Position> {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = Some(position);
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Modules are sequenced per course.
pub fn module_scope() -> ScopeKey<Module> {
    ScopeKey::new("course", |module: &Module| module.course_id)
}

/// Contents are sequenced per module.
pub fn content_scope() -> ScopeKey<Content> {
    ScopeKey::new("module", |content: &Content| content.module_id)
}
