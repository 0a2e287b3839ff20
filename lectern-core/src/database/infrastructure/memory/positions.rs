use std::{collections::HashMap, fmt};

use async_trait::async_trait;
use lectern_model::Position;
use tokio::sync::Mutex;

use crate::database::ports::positions::{InsertGuard, PositionStore};
use crate::error::{CoreError, Result};
use crate::ordering::{Orderable, ScopeKey};

/// Process-local [`PositionStore`] for any [`Orderable`] entity.
///
/// The guard check and the insert happen under one lock, so a stale
/// `observed_max` is always detected.
pub struct InMemoryPositionStore<E: Orderable> {
    scope_key: ScopeKey<E>,
    rows: Mutex<HashMap<E::Id, E>>,
}

impl<E: Orderable> InMemoryPositionStore<E> {
    pub fn new(scope_key: ScopeKey<E>) -> Self {
        Self {
            scope_key,
            rows: Mutex::new(HashMap::new()),
        }
    }

    fn max_in<'a>(
        &self,
        rows: impl Iterator<Item = &'a E>,
        scope: &E::Scope,
    ) -> Option<Position> {
        rows.filter(|row| &self.scope_key.of(row) == scope)
            .filter_map(|row| row.position())
            .max()
    }
}

impl<E: Orderable> fmt::Debug for InMemoryPositionStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryPositionStore")
            .field("kind", &E::KIND)
            .field("scope_key", &self.scope_key)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<E: Orderable> PositionStore<E> for InMemoryPositionStore<E> {
    async fn max_position(&self, scope: &E::Scope) -> Result<Option<Position>> {
        let rows = self.rows.lock().await;
        Ok(self.max_in(rows.values(), scope))
    }

    async fn find(&self, id: E::Id) -> Result<Option<E>> {
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn insert(&self, entity: E, guard: InsertGuard) -> Result<E> {
        if entity.position().is_none() {
            return Err(CoreError::Internal(format!(
                "{} {} has no position",
                E::KIND,
                entity.id()
            )));
        }

        let mut rows = self.rows.lock().await;
        if let InsertGuard::Sequenced { observed_max } = guard {
            let scope = self.scope_key.of(&entity);
            if self.max_in(rows.values(), &scope) != observed_max {
                return Err(CoreError::conflict(scope));
            }
        }
        if rows.contains_key(&entity.id()) {
            return Err(CoreError::InvalidInput(format!(
                "{} {} already exists",
                E::KIND,
                entity.id()
            )));
        }
        rows.insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn update_position(&self, id: E::Id, position: Position) -> Result<bool> {
        let mut rows = self.rows.lock().await;
        Ok(match rows.get_mut(&id) {
            Some(row) => {
                row.set_position(position);
                true
            }
            None => false,
        })
    }

    async fn update_fields(&self, entity: &E) -> Result<bool> {
        let mut rows = self.rows.lock().await;
        let Some(row) = rows.get_mut(&entity.id()) else {
            return Ok(false);
        };
        let position = row.position();
        *row = entity.clone();
        if let Some(position) = position {
            row.set_position(position);
        }
        Ok(true)
    }

    async fn list_in_scope(&self, scope: &E::Scope) -> Result<Vec<E>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .values()
            .filter(|row| &self.scope_key.of(row) == scope)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: E::Id) -> Result<Option<E>> {
        Ok(self.rows.lock().await.remove(&id))
    }

    async fn delete_scope(&self, scope: &E::Scope) -> Result<u64> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|_, row| &self.scope_key.of(row) != scope);
        Ok((before - rows.len()) as u64)
    }
}
