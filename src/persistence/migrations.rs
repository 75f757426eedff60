//! Schema migrations.
//!
//! Migrations are plain `<version>_<description>.sql` files read at run time
//! from `database.migrations_dir`. Applying them is idempotent: versions
//! already recorded in `_sqlx_migrations` are skipped.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;
use sqlx::migrate::Migrator;
use sqlx::PgPool;

use crate::persistence::PersistenceError;

/// Outcome of a migration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Migrations found in the source directory.
    pub available: usize,
    /// Wall time spent applying.
    pub elapsed: Duration,
}

/// Read and parse every migration in `dir`. Touches no database.
pub async fn load(dir: PathBuf) -> Result<Migrator, PersistenceError> {
    let dir_display = dir.display().to_string();
    let migrator = Migrator::new(dir).await?;
    tracing::debug!(dir = %dir_display, available = migrator.iter().count(), "Migrations loaded");
    Ok(migrator)
}

/// Apply every pending migration of `migrator` on a connection from `pool`.
pub async fn apply(migrator: &Migrator, pool: &PgPool) -> Result<MigrationReport, PersistenceError> {
    let available = migrator.iter().count();
    tracing::info!(available, "Applying pending schema migrations");

    let started = Instant::now();
    migrator.run(pool).await?;

    let report = MigrationReport {
        available,
        elapsed: started.elapsed(),
    };
    tracing::info!(elapsed_ms = report.elapsed.as_millis() as u64, "Schema migrations applied");

    Ok(report)
}
