//! §4.12: single shared `PgPool`, created once at bootstrap and cloned
//! (cheap, `Arc`-backed internally) into every repository.

use ingestgate_core::error::{Error, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DbConfig;
use crate::migrations::run_migrations;

pub async fn connect(database_url: &str, config: DbConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(Some(config.idle_timeout))
        .max_lifetime(Some(config.max_lifetime))
        .test_before_acquire(true)
        .connect(database_url)
        .await
        .map_err(|e| Error::Database(format!("failed to connect to postgres: {e}")))?;

    run_migrations(&pool).await?;

    Ok(pool)
}
