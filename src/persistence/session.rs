//! Scoped persistence sessions.

use std::time::Instant;

use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, Postgres};

use crate::persistence::PersistenceError;

/// A database session owned by exactly one unit of work.
///
/// The underlying connection goes back to the pool when the session is
/// dropped, whether the unit of work finished normally, returned an error,
/// or unwound.
pub struct Session {
    conn: PoolConnection<Postgres>,
    acquired_at: Instant,
}

impl Session {
    pub(crate) fn new(conn: PoolConnection<Postgres>) -> Self {
        Self {
            conn,
            acquired_at: Instant::now(),
        }
    }

    /// Borrow the connection for queries.
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }

    /// Round-trip a trivial query.
    pub async fn ping(&mut self) -> Result<(), PersistenceError> {
        sqlx::query("SELECT 1").execute(self.connection()).await?;
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::trace!(
            held_ms = self.acquired_at.elapsed().as_millis() as u64,
            "Persistence session released"
        );
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("acquired_at", &self.acquired_at)
            .finish_non_exhaustive()
    }
}
