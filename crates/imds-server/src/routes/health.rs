//! Liveness probe: `GET /health`.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// `GET /health`: 200 while the store answers a ping, 503 otherwise.
async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, AppError> {
    let ctx = state.request_context();
    if let Err(e) = ctx.run("ping", state.querier.ping()).await {
        tracing::warn!(error = %e, "health check failed");
        return Err(AppError::Unavailable("metadata store is unreachable".to_owned()));
    }

    tracing::debug!("health check ok");
    Ok(Json(HealthResponse {
        status: "ok",
        message: "Metadata service is running",
    }))
}
