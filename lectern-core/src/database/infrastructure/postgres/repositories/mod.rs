//! PostgreSQL-backed repository implementations.

pub mod contents;
pub mod courses;
pub mod modules;

use lectern_model::Position;
use sqlx::PgConnection;

use crate::database::ports::positions::InsertGuard;
use crate::error::{CoreError, Result};

/// Serialize position assignment for one scope across every process
/// sharing the database. Released when the surrounding transaction ends.
pub(crate) async fn lock_scope(conn: &mut PgConnection, kind: &str, scope: &str) -> Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(format!("{kind}:{scope}"))
        .execute(conn)
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to lock {kind} scope {scope}: {e}")))?;
    Ok(())
}

/// Re-read the scope maximum under the advisory lock and reject the insert
/// if it moved since the sequencer observed it.
pub(crate) async fn check_guard(
    conn: &mut PgConnection,
    max_query: &str,
    scope_id: uuid::Uuid,
    scope: &str,
    guard: InsertGuard,
) -> Result<()> {
    let InsertGuard::Sequenced { observed_max } = guard else {
        return Ok(());
    };
    let current: Option<i32> = sqlx::query_scalar(max_query)
        .bind(scope_id)
        .fetch_one(conn)
        .await?;
    if to_position(current)? != observed_max {
        return Err(CoreError::conflict(scope));
    }
    Ok(())
}

pub(crate) fn to_position(raw: Option<i32>) -> Result<Option<Position>> {
    raw.map(Position::try_from)
        .transpose()
        .map_err(CoreError::from)
}

pub(crate) fn require_position(kind: &str, position: Option<Position>) -> Result<i32> {
    position
        .map(Position::to_i32)
        .ok_or_else(|| CoreError::Internal(format!("{kind} has no position")))
}

/// Map a unique-constraint violation to a user-facing input error.
pub(crate) fn unique_violation(err: sqlx::Error, message: impl FnOnce() -> String) -> CoreError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => CoreError::InvalidInput(message()),
        _ => CoreError::Database(err),
    }
}
