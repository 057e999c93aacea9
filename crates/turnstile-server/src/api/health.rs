//! Health check endpoint for the Turnstile Server

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use tracing::debug;

use super::AppState;

/// Health check handler
///
/// Reports liveness, the build version and the executors this process can
/// dispatch to.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");

    let uptime_secs = (Utc::now() - state.started_at).num_seconds();

    Json(json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSeconds": uptime_secs,
        "executors": state.executors.as_slice(),
    }))
}
