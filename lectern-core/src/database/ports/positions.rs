use async_trait::async_trait;
use lectern_model::Position;

use crate::error::Result;
use crate::ordering::Orderable;

/// Precondition attached to an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertGuard {
    /// The caller supplied the position; store it as-is.
    Explicit,
    /// The position was derived from `observed_max`. The store must reject
    /// the insert with `CoreError::PositionConflict` if the scope maximum
    /// changed since that read.
    Sequenced { observed_max: Option<Position> },
}

/// Persistence port for entities ordered within a scope.
#[async_trait]
pub trait PositionStore<E: Orderable>: Send + Sync {
    /// Highest persisted position in `scope`, `None` when the scope is empty.
    async fn max_position(&self, scope: &E::Scope) -> Result<Option<Position>>;

    async fn find(&self, id: E::Id) -> Result<Option<E>>;

    /// Persist a new entity. Its position must already be set.
    async fn insert(&self, entity: E, guard: InsertGuard) -> Result<E>;

    /// Overwrite the position of `id`. Returns `false` if it does not exist.
    async fn update_position(&self, id: E::Id, position: Position) -> Result<bool>;

    /// Persist every field except the position.
    async fn update_fields(&self, entity: &E) -> Result<bool>;

    /// All entities in `scope`, in no particular order.
    async fn list_in_scope(&self, scope: &E::Scope) -> Result<Vec<E>>;

    async fn delete(&self, id: E::Id) -> Result<Option<E>>;

    /// Remove every entity of `scope`, returning how many were removed.
    async fn delete_scope(&self, scope: &E::Scope) -> Result<u64>;
}
