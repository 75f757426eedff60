//! Tool capability.

use std::sync::Arc;

use async_trait::async_trait;

use crate::persistence::ContextFactory;
use crate::services::{count_rows, ServiceError};

#[async_trait]
pub trait ToolService: Send + Sync {
    /// Number of registered tools, across all kits.
    async fn count(&self) -> Result<i64, ServiceError>;
}

pub struct PgToolService {
    db: Arc<dyn ContextFactory>,
}

impl PgToolService {
    pub fn new(db: Arc<dyn ContextFactory>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ToolService for PgToolService {
    async fn count(&self) -> Result<i64, ServiceError> {
        count_rows(self.db.as_ref(), "SELECT COUNT(*) FROM tools").await
    }
}
