use std::{fmt, hash::Hash, sync::Arc};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-scope async mutexes serializing position assignment inside one
/// process. Cross-process safety comes from the store's guarded insert.
pub struct ScopeLocks<S> {
    inner: Arc<DashMap<S, Arc<Mutex<()>>>>,
}

impl<S> Clone for ScopeLocks<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Eq + Hash> Default for ScopeLocks<S> {
    fn default() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
        }
    }
}

impl<S: Eq + Hash> fmt::Debug for ScopeLocks<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeLocks")
            .field("scopes", &self.inner.len())
            .finish()
    }
}

impl<S: Eq + Hash + Clone> ScopeLocks<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `scope`. The lock is held until the
    /// returned guard is dropped.
    pub async fn acquire(&self, scope: &S) -> OwnedMutexGuard<()> {
        // The map shard guard must be released before awaiting.
        let lock = {
            let entry = self.inner.entry(scope.clone()).or_default();
            Arc::clone(entry.value())
        };
        lock.lock_owned().await
    }

    /// Drop lock entries nobody currently holds or waits on.
    pub fn prune_idle(&self) {
        self.inner.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
