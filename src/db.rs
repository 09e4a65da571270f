use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;

use crate::config::AppConfig;

pub type DbPool = sqlx::PgPool;

/// Create the shared connection pool. Acquire fails with a pool timeout once
/// `max_connections` handles are checked out for `acquire_timeout_secs`.
pub async fn create_pool(config: &AppConfig) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.database_url)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
