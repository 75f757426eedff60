//! Liveness and readiness endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::health::probe::{probe_dependency, ProbeOutcome};
use crate::http::{AppError, AppState};

#[derive(Debug, Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Readiness {
    pub status: &'static str,
    pub database: &'static str,
    pub model_api: ProbeOutcome,
}

pub async fn liveness() -> Json<Liveness> {
    Json(Liveness {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Ready when a database session round-trips. The model API result is
/// reported but does not affect readiness.
pub async fn readiness(State(state): State<AppState>) -> Result<Json<Readiness>, AppError> {
    {
        let mut session = state
            .db
            .session()
            .await
            .map_err(|e| AppError::Unavailable(format!("database not ready: {}", e)))?;
        session
            .ping()
            .await
            .map_err(|e| AppError::Unavailable(format!("database not ready: {}", e)))?;
    }

    let model_api = probe_dependency(&state.model_api, &state.settings.app_settings.model_api.health_path).await;

    Ok(Json(Readiness {
        status: "ready",
        database: "ok",
        model_api,
    }))
}
