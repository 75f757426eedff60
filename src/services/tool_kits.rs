//! Tool kit capability.

use std::sync::Arc;

use async_trait::async_trait;

use crate::persistence::ContextFactory;
use crate::services::{count_rows, ServiceError};

#[async_trait]
pub trait ToolKitService: Send + Sync {
    /// Number of registered tool kits.
    async fn count(&self) -> Result<i64, ServiceError>;
}

pub struct PgToolKitService {
    db: Arc<dyn ContextFactory>,
}

impl PgToolKitService {
    pub fn new(db: Arc<dyn ContextFactory>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ToolKitService for PgToolKitService {
    async fn count(&self) -> Result<i64, ServiceError> {
        count_rows(self.db.as_ref(), "SELECT COUNT(*) FROM tool_kits").await
    }
}
