//! Composition: build every shared component once, in dependency order.

use std::sync::Arc;

use crate::clients::{HttpClientFactory, MODEL_API_CLIENT};
use crate::config::Settings;
use crate::http::AppState;
use crate::lifecycle::startup::StartupError;
use crate::persistence::{ContextFactory, PgContextFactory};
use crate::services::ServiceRegistry;

/// Compose against PostgreSQL.
pub fn compose(settings: Settings) -> Result<AppState, StartupError> {
    let db = PgContextFactory::new(&settings.connection_strings.default_connection, &settings.database)
        .map_err(StartupError::Database)?;
    compose_with_database(settings, Arc::new(db))
}

/// Compose with a caller-supplied context factory.
pub fn compose_with_database(settings: Settings, db: Arc<dyn ContextFactory>) -> Result<AppState, StartupError> {
    let mut clients = HttpClientFactory::new();
    clients.register(MODEL_API_CLIENT, &settings.app_settings.model_api)?;
    let model_api = clients.client(MODEL_API_CLIENT)?;

    let services = ServiceRegistry::with_defaults(Arc::clone(&db));

    tracing::info!(
        model_api = %model_api.base_url(),
        bind_address = %settings.server.bind_address,
        "Components composed"
    );

    Ok(AppState {
        settings: Arc::new(settings),
        model_api,
        db,
        services,
    })
}
