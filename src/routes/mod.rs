//! Route table.
//!
//! Built-in operational routes plus the domain overview. Every handler runs
//! behind the error-handling middleware installed by `http::assemble`.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::health::handlers::{liveness, readiness};
use crate::http::{AppError, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(liveness))
        .route("/health/ready", get(readiness))
        .route("/api/overview", get(overview))
}

#[derive(Debug, Serialize)]
pub struct Overview {
    pub tool_kits: i64,
    pub tools: i64,
    pub employees: i64,
}

/// Resolves each capability for this request only.
async fn overview(State(state): State<AppState>) -> Result<Json<Overview>, AppError> {
    let tool_kits = state.services.tool_kits().count().await?;
    let tools = state.services.tools().count().await?;
    let employees = state.services.employees().count().await?;

    Ok(Json(Overview {
        tool_kits,
        tools,
        employees,
    }))
}
