use std::{collections::HashMap, fmt, sync::Arc};

use lectern_model::{Position, UserId};
use tracing::{debug, info, instrument, warn};

use crate::database::ports::positions::{InsertGuard, PositionStore};
use crate::error::{CoreError, Result};

use super::{
    OrderedList, Orderable, ReorderBatch, ReorderOutcome, ReorderPolicy,
    ScopeKey, ScopeLocks, ScopeOwnership, SkipReason,
};

/// Lock entries are pruned once this many scopes have been seen.
const LOCK_PRUNE_THRESHOLD: usize = 1024;

/// Tunables for a [`PositionSequencer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerSettings {
    pub reorder_policy: ReorderPolicy,
    /// Attempts made by `create` before a position conflict is surfaced.
    pub assign_attempts: u8,
}

impl Default for SequencerSettings {
    fn default() -> Self {
        Self {
            reorder_policy: ReorderPolicy::BestEffort,
            assign_attempts: 2,
        }
    }
}

/// Owns the "next position within a scope" invariant for one entity type
/// and applies ownership-scoped reorder batches.
pub struct PositionSequencer<E: Orderable> {
    store: Arc<dyn PositionStore<E>>,
    scope_key: ScopeKey<E>,
    ownership: Arc<dyn ScopeOwnership<E::Scope>>,
    locks: ScopeLocks<E::Scope>,
    settings: SequencerSettings,
}

impl<E: Orderable> Clone for PositionSequencer<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            scope_key: self.scope_key.clone(),
            ownership: Arc::clone(&self.ownership),
            locks: self.locks.clone(),
            settings: self.settings,
        }
    }
}

impl<E: Orderable> fmt::Debug for PositionSequencer<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionSequencer")
            .field("kind", &E::KIND)
            .field("scope_key", &self.scope_key)
            .field("locks", &self.locks)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<E: Orderable> PositionSequencer<E> {
    pub fn new(
        store: Arc<dyn PositionStore<E>>,
        scope_key: ScopeKey<E>,
        ownership: Arc<dyn ScopeOwnership<E::Scope>>,
    ) -> Self {
        Self {
            store,
            scope_key,
            ownership,
            locks: ScopeLocks::new(),
            settings: SequencerSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SequencerSettings) -> Self {
        self.settings = SequencerSettings {
            assign_attempts: settings.assign_attempts.max(1),
            ..settings
        };
        self
    }

    pub fn settings(&self) -> SequencerSettings {
        self.settings
    }

    pub fn scope_of(&self, entity: &E) -> E::Scope {
        self.scope_key.of(entity)
    }

    /// Give `entity` its initial position unless it already has one.
    ///
    /// The new value is one past the current scope maximum, or zero for an
    /// empty scope. Callers racing on the same scope must serialize through
    /// [`PositionSequencer::create`], which holds the scope lock and guards
    /// the insert.
    pub async fn assign_initial_position(&self, entity: &mut E) -> Result<Position> {
        let scope = self.scope_key.of(entity);
        self.assign(entity, &scope).await.map(|(position, _)| position)
    }

    async fn assign(
        &self,
        entity: &mut E,
        scope: &E::Scope,
    ) -> Result<(Position, InsertGuard)> {
        if let Some(existing) = entity.position() {
            return Ok((existing, InsertGuard::Explicit));
        }

        let observed_max = self.store.max_position(scope).await?;
        let position = Position::after(observed_max)?;
        entity.set_position(position);
        Ok((position, InsertGuard::Sequenced { observed_max }))
    }

    /// Assign the initial position and persist `entity`.
    ///
    /// Assignment is serialized per scope. If the store still reports a
    /// conflict (another process won the race) the maximum is re-read and
    /// the insert retried, up to `assign_attempts` in total.
    #[instrument(skip_all, fields(kind = E::KIND), err)]
    pub async fn create(&self, entity: E) -> Result<E> {
        let scope = self.scope_key.of(&entity);
        let saved = {
            let _scope_guard = self.locks.acquire(&scope).await;
            self.create_locked(entity, &scope).await?
        };

        if self.locks.len() > LOCK_PRUNE_THRESHOLD {
            self.locks.prune_idle();
        }
        Ok(saved)
    }

    async fn create_locked(&self, entity: E, scope: &E::Scope) -> Result<E> {
        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let mut candidate = entity.clone();
            let (position, guard) = self.assign(&mut candidate, scope).await?;

            match self.store.insert(candidate, guard).await {
                Ok(saved) => {
                    debug!(
                        id = %saved.id(),
                        scope = %scope,
                        position = %position,
                        explicit = matches!(guard, InsertGuard::Explicit),
                        "{} created",
                        E::KIND
                    );
                    return Ok(saved);
                }
                Err(err) if err.is_conflict() && attempt < self.settings.assign_attempts => {
                    warn!(
                        scope = %scope,
                        attempt,
                        "position assignment lost a race; retrying with a fresh maximum"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Apply `batch` to the entities the actor owns.
    ///
    /// Entries are independent: there is no contiguity or uniqueness check
    /// on the resulting positions. Missing and foreign ids are handled per
    /// the configured [`ReorderPolicy`].
    #[instrument(skip_all, fields(kind = E::KIND, entries = batch.len(), actor = %actor), err)]
    pub async fn reorder_batch(
        &self,
        batch: &ReorderBatch<E::Id>,
        actor: UserId,
    ) -> Result<ReorderOutcome<E::Id>> {
        let mut owned_scopes: HashMap<E::Scope, bool> = HashMap::new();
        let mut resolved = Vec::with_capacity(batch.len());

        for (id, position) in batch.iter() {
            let verdict = self.authorize(id, actor, &mut owned_scopes).await?;
            if self.settings.reorder_policy == ReorderPolicy::FailFast {
                match verdict {
                    Some(SkipReason::NotFound) => {
                        return Err(CoreError::not_found(format!("{} {id}", E::KIND)));
                    }
                    Some(SkipReason::Unauthorized) => {
                        return Err(CoreError::forbidden(format!(
                            "{} {id} is not owned by {actor}",
                            E::KIND
                        )));
                    }
                    None => {}
                }
            }
            resolved.push((id, position, verdict));
        }

        let mut outcome = ReorderOutcome::default();
        for (id, position, verdict) in resolved {
            if let Some(reason) = verdict {
                debug!(%id, ?reason, "skipping reorder entry");
                outcome.skipped.push((id, reason));
                continue;
            }

            if self.store.update_position(id, position).await? {
                outcome.applied.push(id);
            } else {
                debug!(%id, "entity vanished before its position was written");
                outcome.skipped.push((id, SkipReason::NotFound));
            }
        }

        info!(
            applied = outcome.applied.len(),
            skipped = outcome.skipped.len(),
            policy = %self.settings.reorder_policy,
            "{} reorder batch processed",
            E::KIND
        );
        Ok(outcome)
    }

    async fn authorize(
        &self,
        id: E::Id,
        actor: UserId,
        owned_scopes: &mut HashMap<E::Scope, bool>,
    ) -> Result<Option<SkipReason>> {
        let Some(entity) = self.store.find(id).await? else {
            return Ok(Some(SkipReason::NotFound));
        };

        let scope = self.scope_key.of(&entity);
        let owned = match owned_scopes.get(&scope) {
            Some(owned) => *owned,
            None => {
                let owned = self.ownership.is_owned_by(&scope, actor).await?;
                owned_scopes.insert(scope, owned);
                owned
            }
        };

        Ok((!owned).then_some(SkipReason::Unauthorized))
    }

    /// Entities of `scope` sorted by position, then creation time, then id.
    pub async fn list_ordered(&self, scope: &E::Scope) -> Result<OrderedList<E>> {
        let entities = self.store.list_in_scope(scope).await?;
        Ok(OrderedList::sorted(entities))
    }
}
