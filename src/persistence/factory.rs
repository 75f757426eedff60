//! Database context factory.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::persistence::migrations::{self, MigrationReport};
use crate::persistence::{PersistenceError, Session};

/// Produces scoped sessions and applies schema migrations.
#[async_trait]
pub trait ContextFactory: Send + Sync {
    /// Acquire a session for one unit of work.
    async fn session(&self) -> Result<Session, PersistenceError>;

    /// Apply pending schema migrations.
    async fn migrate(&self) -> Result<MigrationReport, PersistenceError>;
}

/// PostgreSQL-backed context factory.
#[derive(Debug, Clone)]
pub struct PgContextFactory {
    pool: PgPool,
    migrations_dir: PathBuf,
}

impl PgContextFactory {
    /// Build the pool from a connection string.
    ///
    /// No connection is opened here; a malformed connection string still
    /// fails immediately.
    pub fn new(connection_string: &str, config: &DatabaseConfig) -> Result<Self, PersistenceError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(600))
            .connect_lazy(connection_string)
            .map_err(PersistenceError::Configuration)?;

        tracing::debug!(
            max_connections = config.max_connections,
            migrations_dir = %config.migrations_dir,
            "Context factory registered"
        );

        Ok(Self {
            pool,
            migrations_dir: PathBuf::from(&config.migrations_dir),
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ContextFactory for PgContextFactory {
    async fn session(&self) -> Result<Session, PersistenceError> {
        let conn = self.pool.acquire().await.map_err(PersistenceError::Acquire)?;
        Ok(Session::new(conn))
    }

    async fn migrate(&self) -> Result<MigrationReport, PersistenceError> {
        let migrator = migrations::load(self.migrations_dir.clone()).await?;
        migrations::apply(&migrator, &self.pool).await
    }
}
