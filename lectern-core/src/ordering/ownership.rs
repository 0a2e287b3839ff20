use async_trait::async_trait;
use lectern_model::UserId;

use crate::error::Result;

/// Authorization predicate restricting which scopes an actor may reorder.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScopeOwnership<S: Send + Sync + 'static>: Send + Sync {
    async fn is_owned_by(&self, scope: &S, actor: UserId) -> Result<bool>;
}
