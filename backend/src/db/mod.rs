//! Storage wiring
//!
//! Builds the credential store selected by `storage.backend`. The
//! PostgreSQL pool gets bounded lifetimes and a liveness test before each
//! acquire.

use crate::config::{StorageBackend, StorageConfig};
use crate::repositories::{CredentialStore, InMemoryCredentialStore, PgCredentialStore};
use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const MIN_CONNECTIONS: u32 = 1;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Open the credential store described by `config`
///
/// Migrations run against PostgreSQL when `migrate` is set.
pub async fn connect_store(
    config: &StorageConfig,
    migrate: bool,
) -> Result<Arc<dyn CredentialStore>> {
    match config.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory credential store; users are lost on restart");
            Ok(Arc::new(InMemoryCredentialStore::new()))
        }
        StorageBackend::Postgres => {
            let pool = create_pool(config).await?;
            if migrate {
                run_migrations(&pool).await?;
            }
            Ok(Arc::new(PgCredentialStore::new(pool)))
        }
    }
}

/// Create a PostgreSQL connection pool
pub async fn create_pool(config: &StorageConfig) -> Result<PgPool> {
    let connect_options = PgConnectOptions::from_str(&config.url)
        .context("Invalid storage.url")?
        .application_name("sys-touch");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(MIN_CONNECTIONS.min(config.max_connections))
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!(max_connections = config.max_connections, "Database pool created");

    Ok(pool)
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}

/// Check database health
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            warn!("Database health check failed: {}", e);
            e.into()
        })
}
