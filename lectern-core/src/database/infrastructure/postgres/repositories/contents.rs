use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lectern_model::{Content, ContentId, ContentItem, ModuleId, Position};
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::debug;
use uuid::Uuid;

use super::{check_guard, lock_scope, require_position, to_position};
use crate::database::ports::positions::{InsertGuard, PositionStore};
use crate::error::{CoreError, Result};

const MAX_POSITION: &str = "SELECT MAX(position) FROM contents WHERE module_id = $1";
const CONTENT_COLUMNS: &str = "id, module_id, position, item, created_at";

/// PostgreSQL-backed [`PositionStore`] for content slots. Items are stored
/// as JSONB tagged by kind.
#[derive(Clone, Debug)]
pub struct PostgresContentRepository {
    pool: PgPool,
}

impl PostgresContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: &PgRow) -> Result<Content> {
        let position: i32 = row.try_get("position")?;
        let Json(item) = row.try_get::<Json<ContentItem>, _>("item")?;
        Ok(Content {
            id: ContentId::from(row.try_get::<Uuid, _>("id")?),
            module_id: ModuleId::from(row.try_get::<Uuid, _>("module_id")?),
            position: Some(Position::try_from(position)?),
            item,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

#[async_trait]
impl PositionStore<Content> for PostgresContentRepository {
    async fn max_position(&self, scope: &ModuleId) -> Result<Option<Position>> {
        let max: Option<i32> = sqlx::query_scalar(MAX_POSITION)
            .bind(scope.to_uuid())
            .fetch_one(self.pool())
            .await?;
        to_position(max)
    }

    async fn find(&self, id: ContentId) -> Result<Option<Content>> {
        let row = sqlx::query(&format!("SELECT {CONTENT_COLUMNS} FROM contents WHERE id = $1"))
            .bind(id.to_uuid())
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn insert(&self, content: Content, guard: InsertGuard) -> Result<Content> {
        let position = require_position("content", content.position)?;
        let scope = content.module_id.to_string();

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to start transaction: {e}")))?;

        lock_scope(&mut tx, "content", &scope).await?;
        check_guard(&mut tx, MAX_POSITION, content.module_id.to_uuid(), &scope, guard).await?;

        sqlx::query(
            r#"
            INSERT INTO contents (id, module_id, position, kind, item, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(content.id.to_uuid())
        .bind(content.module_id.to_uuid())
        .bind(position)
        .bind(content.item.kind().as_str())
        .bind(Json(&content.item))
        .bind(content.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to insert content: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to commit content insert: {e}")))?;

        debug!(
            content_id = %content.id,
            module_id = %content.module_id,
            kind = %content.item.kind(),
            position,
            "content stored"
        );
        Ok(content)
    }

    async fn update_position(&self, id: ContentId, position: Position) -> Result<bool> {
        let result = sqlx::query("UPDATE contents SET position = $2 WHERE id = $1")
            .bind(id.to_uuid())
            .bind(position.to_i32())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_fields(&self, content: &Content) -> Result<bool> {
        let result = sqlx::query("UPDATE contents SET item = $2 WHERE id = $1")
            .bind(content.id.to_uuid())
            .bind(Json(&content.item))
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_in_scope(&self, scope: &ModuleId) -> Result<Vec<Content>> {
        let rows = sqlx::query(&format!(
            "SELECT {CONTENT_COLUMNS} FROM contents WHERE module_id = $1 \
             ORDER BY position, created_at, id"
        ))
        .bind(scope.to_uuid())
        .fetch_all(self.pool())
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to list contents of {scope}: {e}")))?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn delete(&self, id: ContentId) -> Result<Option<Content>> {
        let row = sqlx::query(&format!(
            "DELETE FROM contents WHERE id = $1 RETURNING {CONTENT_COLUMNS}"
        ))
        .bind(id.to_uuid())
        .fetch_optional(self.pool())
        .await?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn delete_scope(&self, scope: &ModuleId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM contents WHERE module_id = $1")
            .bind(scope.to_uuid())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}
