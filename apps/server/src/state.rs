//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use crate::{
    config::Config,
    db::{PostgresResourceStore, ResourceStore},
    services::{ChargeValidator, ResourceService, TaskRunner},
};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub resources: Arc<ResourceService>,
    pub task_runner: Arc<TaskRunner>,
    pub charge_validator: Arc<ChargeValidator>,
}

impl AppState {
    /// Connect to PostgreSQL, run pending migrations, and assemble services.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(config.database.pool_min_size)
            .max_connections(config.database.pool_max_size)
            .acquire_timeout(Duration::from_secs(config.database.pool_timeout_seconds))
            .connect(&config.database.url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");

        let store: Arc<dyn ResourceStore> = Arc::new(PostgresResourceStore::new(pool));
        Ok(Self::with_store(config, store))
    }

    /// Assemble services over an arbitrary store. Tests use this with the
    /// in-memory store.
    pub fn with_store(config: Config, store: Arc<dyn ResourceStore>) -> Self {
        Self {
            config: Arc::new(config),
            resources: Arc::new(ResourceService::new(store.clone())),
            task_runner: Arc::new(TaskRunner::new(store.clone())),
            charge_validator: Arc::new(ChargeValidator::new(store)),
        }
    }
}
