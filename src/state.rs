use crate::{configuration::Settings, modules::database::get_postgres_pool};
use axum::extract::FromRef;
use sqlx::PgPool;

#[derive(FromRef, Clone)]
pub struct AppState {
    pub postgres: PgPool,
}

impl AppState {
    pub async fn new(config: &Settings, test_pool: Option<PgPool>) -> anyhow::Result<Self> {
        let postgres = match test_pool {
            Some(pool) => pool,
            None => get_postgres_pool(&config.postgres).await?,
        };

        Ok(AppState { postgres })
    }
}
