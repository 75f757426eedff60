//! Capability bindings.

use std::sync::Arc;

use crate::persistence::ContextFactory;
use crate::services::{
    EmployeeService, PgEmployeeService, PgToolKitService, PgToolService, ToolKitService, ToolService,
};

type Constructor<T> = dyn Fn(&Arc<dyn ContextFactory>) -> Box<T> + Send + Sync;

/// A transient binding: every `resolve` builds a new instance.
pub struct Transient<T: ?Sized> {
    construct: Arc<Constructor<T>>,
}

impl<T: ?Sized> Transient<T> {
    pub fn new<F>(construct: F) -> Self
    where
        F: Fn(&Arc<dyn ContextFactory>) -> Box<T> + Send + Sync + 'static,
    {
        Self {
            construct: Arc::new(construct),
        }
    }

    pub fn resolve(&self, db: &Arc<dyn ContextFactory>) -> Box<T> {
        (self.construct)(db)
    }
}

impl<T: ?Sized> Clone for Transient<T> {
    fn clone(&self) -> Self {
        Self {
            construct: Arc::clone(&self.construct),
        }
    }
}

/// Binds each domain capability to exactly one implementation.
#[derive(Clone)]
pub struct ServiceRegistry {
    db: Arc<dyn ContextFactory>,
    tool_kits: Transient<dyn ToolKitService>,
    tools: Transient<dyn ToolService>,
    employees: Transient<dyn EmployeeService>,
}

impl ServiceRegistry {
    pub fn new(
        db: Arc<dyn ContextFactory>,
        tool_kits: Transient<dyn ToolKitService>,
        tools: Transient<dyn ToolService>,
        employees: Transient<dyn EmployeeService>,
    ) -> Self {
        Self {
            db,
            tool_kits,
            tools,
            employees,
        }
    }

    /// Default bindings: PostgreSQL-backed services over `db`.
    pub fn with_defaults(db: Arc<dyn ContextFactory>) -> Self {
        Self::new(
            db,
            Transient::new(|db: &Arc<dyn ContextFactory>| -> Box<dyn ToolKitService> {
                Box::new(PgToolKitService::new(Arc::clone(db)))
            }),
            Transient::new(|db: &Arc<dyn ContextFactory>| -> Box<dyn ToolService> {
                Box::new(PgToolService::new(Arc::clone(db)))
            }),
            Transient::new(|db: &Arc<dyn ContextFactory>| -> Box<dyn EmployeeService> {
                Box::new(PgEmployeeService::new(Arc::clone(db)))
            }),
        )
    }

    pub fn tool_kits(&self) -> Box<dyn ToolKitService> {
        self.tool_kits.resolve(&self.db)
    }

    pub fn tools(&self) -> Box<dyn ToolService> {
        self.tools.resolve(&self.db)
    }

    pub fn employees(&self) -> Box<dyn EmployeeService> {
        self.employees.resolve(&self.db)
    }
}
