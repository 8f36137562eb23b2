//! Wiring a service from system configuration.

use plinth_builder::BuilderRegistry;
use plinth_config::{PoolConfig, SystemConfig};
use plinth_db::{DbError, PgAppRepo, PgPlatformRepo, run_migrations};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::PlatformService;

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("database-url is not configured")]
    MissingDatabaseUrl,

    #[error(transparent)]
    Db(#[from] DbError),
}

/// Pool options for the configured `database-pool` settings.
pub fn pool_options(pool: &PoolConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(pool.max_connections)
        .min_connections(pool.min_connections)
        .acquire_timeout(Duration::from_secs(pool.acquire_timeout_secs))
}

/// Connect to PostgreSQL, apply migrations and build a service backed by it.
///
/// The registry starts empty with the configured default builder name;
/// backends are registered by the embedder through
/// [`PlatformService::registry`].
pub async fn connect(config: &SystemConfig) -> Result<PlatformService, ConnectError> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or(ConnectError::MissingDatabaseUrl)?;

    info!(
        max_connections = config.pool.max_connections,
        "Connecting to database..."
    );
    let pool = pool_options(&config.pool)
        .connect(database_url)
        .await
        .map_err(DbError::from)?;
    run_migrations(&pool).await?;
    info!("Database connected");

    let registry = Arc::new(BuilderRegistry::new(config.default_builder.clone()));
    Ok(PlatformService::new(
        registry,
        Arc::new(PgPlatformRepo::new(pool.clone())),
        Arc::new(PgAppRepo::new(pool)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_config::parse_system_config;

    #[tokio::test]
    async fn test_connect_requires_database_url() {
        let config = parse_system_config(r#"builder "docker" type="docker""#).unwrap();

        let err = connect(&config).await.err().unwrap();
        assert!(matches!(err, ConnectError::MissingDatabaseUrl));
    }

    #[test]
    fn test_pool_options_follow_config() {
        let config = parse_system_config(
            r#"
            database-pool max-connections=4 min-connections=1 acquire-timeout-secs=7
            builder "docker" type="docker"
            "#,
        )
        .unwrap();

        let options = pool_options(&config.pool);
        assert_eq!(options.get_max_connections(), 4);
        assert_eq!(options.get_min_connections(), 1);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(7));
    }

    #[tokio::test]
    async fn test_connect_reports_unreachable_database() {
        let config = parse_system_config(
            r#"
            database-url "postgres://plinth@127.0.0.1:1/plinth"
            database-pool acquire-timeout-secs=1
            builder "docker" type="docker"
            "#,
        )
        .unwrap();

        let err = connect(&config).await.err().unwrap();
        assert!(matches!(err, ConnectError::Db(DbError::Database(_))));
    }
}
