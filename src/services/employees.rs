//! Employee capability.

use std::sync::Arc;

use async_trait::async_trait;

use crate::persistence::ContextFactory;
use crate::services::{count_rows, ServiceError};

#[async_trait]
pub trait EmployeeService: Send + Sync {
    async fn count(&self) -> Result<i64, ServiceError>;
}

pub struct PgEmployeeService {
    db: Arc<dyn ContextFactory>,
}

impl PgEmployeeService {
    pub fn new(db: Arc<dyn ContextFactory>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EmployeeService for PgEmployeeService {
    async fn count(&self) -> Result<i64, ServiceError> {
        count_rows(self.db.as_ref(), "SELECT COUNT(*) FROM employees").await
    }
}
