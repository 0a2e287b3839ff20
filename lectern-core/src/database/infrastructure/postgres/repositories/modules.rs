use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lectern_model::{CourseId, Module, ModuleId, Position};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::debug;
use uuid::Uuid;

use super::{check_guard, lock_scope, require_position, to_position};
use crate::database::ports::positions::{InsertGuard, PositionStore};
use crate::error::{CoreError, Result};

const MAX_POSITION: &str = "SELECT MAX(position) FROM modules WHERE course_id = $1";
const MODULE_COLUMNS: &str = "id, course_id, title, description, position, created_at";

/// PostgreSQL-backed [`PositionStore`] for course modules.
#[derive(Clone, Debug)]
pub struct PostgresModuleRepository {
    pool: PgPool,
}

impl PostgresModuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: &PgRow) -> Result<Module> {
        let position: i32 = row.try_get("position")?;
        Ok(Module {
            id: ModuleId::from(row.try_get::<Uuid, _>("id")?),
            course_id: CourseId::from(row.try_get::<Uuid, _>("course_id")?),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            position: Some(Position::try_from(position)?),
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

#[async_trait]
impl PositionStore<Module> for PostgresModuleRepository {
    async fn max_position(&self, scope: &CourseId) -> Result<Option<Position>> {
        let max: Option<i32> = sqlx::query_scalar(MAX_POSITION)
            .bind(scope.to_uuid())
            .fetch_one(self.pool())
            .await?;
        to_position(max)
    }

    async fn find(&self, id: ModuleId) -> Result<Option<Module>> {
        let row = sqlx::query(&format!("SELECT {MODULE_COLUMNS} FROM modules WHERE id = $1"))
            .bind(id.to_uuid())
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn insert(&self, module: Module, guard: InsertGuard) -> Result<Module> {
        let position = require_position("module", module.position)?;
        let scope = module.course_id.to_string();

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to start transaction: {e}")))?;

        lock_scope(&mut tx, "module", &scope).await?;
        check_guard(&mut tx, MAX_POSITION, module.course_id.to_uuid(), &scope, guard).await?;

        sqlx::query(
            r#"
            INSERT INTO modules (id, course_id, title, description, position, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(module.id.to_uuid())
        .bind(module.course_id.to_uuid())
        .bind(&module.title)
        .bind(&module.description)
        .bind(position)
        .bind(module.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to insert module: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to commit module insert: {e}")))?;

        debug!(module_id = %module.id, course_id = %module.course_id, position, "module stored");
        Ok(module)
    }

    async fn update_position(&self, id: ModuleId, position: Position) -> Result<bool> {
        let result = sqlx::query("UPDATE modules SET position = $2 WHERE id = $1")
            .bind(id.to_uuid())
            .bind(position.to_i32())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_fields(&self, module: &Module) -> Result<bool> {
        let result =
            sqlx::query("UPDATE modules SET title = $2, description = $3 WHERE id = $1")
                .bind(module.id.to_uuid())
                .bind(&module.title)
                .bind(&module.description)
                .execute(self.pool())
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_in_scope(&self, scope: &CourseId) -> Result<Vec<Module>> {
        let rows = sqlx::query(&format!(
            "SELECT {MODULE_COLUMNS} FROM modules WHERE course_id = $1 \
             ORDER BY position, created_at, id"
        ))
        .bind(scope.to_uuid())
        .fetch_all(self.pool())
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to list modules of {scope}: {e}")))?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn delete(&self, id: ModuleId) -> Result<Option<Module>> {
        let row = sqlx::query(&format!(
            "DELETE FROM modules WHERE id = $1 RETURNING {MODULE_COLUMNS}"
        ))
        .bind(id.to_uuid())
        .fetch_optional(self.pool())
        .await?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn delete_scope(&self, scope: &CourseId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM modules WHERE course_id = $1")
            .bind(scope.to_uuid())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }
}
