//! Database connection management.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{error, info};

use crate::config::DbConfig;
use crate::error::{DbError, Result};

/// Owns the connection pool shared by every other store/crate.
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(config: &DbConfig) -> Result<Self> {
        info!(max_connections = config.max_connections, "connecting to database");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await
            .map_err(|e| {
                error!(error = %e, "failed to connect to database");
                DbError::Connection(e.to_string())
            })?;

        info!("database connection established");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs every migration in order. Idempotent: each statement is
    /// `create table if not exists` / `create index if not exists`.
    pub async fn migrate(&self) -> Result<()> {
        info!("running database migrations");

        let migrations: &[(&str, &str)] = &[
            ("0001_core.sql", include_str!("../migrations/0001_core.sql")),
            ("0002_outbox.sql", include_str!("../migrations/0002_outbox.sql")),
            ("0003_approvals.sql", include_str!("../migrations/0003_approvals.sql")),
            (
                "0004_performance_indexes.sql",
                include_str!("../migrations/0004_performance_indexes.sql"),
            ),
        ];

        for (name, sql) in migrations {
            info!(migration = %name, "applying migration");
            sqlx::query(sql).execute(&self.pool).await.map_err(|e| {
                error!(migration = %name, error = %e, "migration failed");
                DbError::Migration(format!("{name}: {e}"))
            })?;
        }

        info!("database migrations completed");
        Ok(())
    }

    pub fn health_monitor(&self) -> super::health::HealthMonitor {
        super::health::HealthMonitor::new(self.pool.clone())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("select 1").execute(&self.pool).await?;
        Ok(())
    }
}
