use crate::configuration::PostgresSettings;
use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Longest a request waits for a pooled connection before the store is
/// treated as unavailable.
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds the shared pool and checks that postgres answers before the
/// listener starts.
pub async fn get_postgres_pool(config: &PostgresSettings) -> anyhow::Result<PgPool> {
    let url = config.get_connection_string()?;
    let pool = PgPoolOptions::new()
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&url)
        .await
        .context("Cannot establish postgres connection")?;
    Ok(pool)
}

pub async fn is_postgres_reachable(pool: &PgPool) -> bool {
    sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()
}
