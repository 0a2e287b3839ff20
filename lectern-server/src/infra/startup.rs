use std::time::Duration;

use anyhow::{Context, Result};
use lectern_config::Config;
use lectern_core::{MIGRATOR, application::AppUnitOfWork};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::{info, warn};

/// Open the PostgreSQL pool described by the configuration.
pub async fn connect_pool(config: &Config) -> Result<Option<PgPool>> {
    let Some(url) = config.database.primary_url.as_deref() else {
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(url)
        .await
        .context("failed to connect to PostgreSQL")?;
    info!(
        max_connections = config.database.max_connections,
        "connected to PostgreSQL"
    );
    Ok(Some(pool))
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("database migration failed")?;
    info!("database migrations applied");
    Ok(())
}

/// Pick the repositories for this process: PostgreSQL when a database URL is
/// configured (migrating it first), in-memory otherwise.
pub async fn build_unit_of_work(config: &Config) -> Result<AppUnitOfWork> {
    match connect_pool(config).await? {
        Some(pool) => {
            run_migrations(&pool).await?;
            Ok(AppUnitOfWork::postgres(pool))
        }
        None => {
            warn!("no database configured; courses are kept in memory only");
            Ok(AppUnitOfWork::in_memory())
        }
    }
}
