//! Shared application state.

use std::sync::Arc;

use crate::clients::NamedClient;
use crate::config::Settings;
use crate::persistence::ContextFactory;
use crate::services::ServiceRegistry;

/// State injected into handlers. Cloned per request; every field is shared
/// and read-only.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub model_api: NamedClient,
    pub db: Arc<dyn ContextFactory>,
    pub services: ServiceRegistry,
}
