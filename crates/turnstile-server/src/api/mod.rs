//! API module for the Turnstile Server
//!
//! This module contains the API routes and handlers for the Turnstile Server.

use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use turnstile_core::Orchestrator;

pub mod errors;
pub mod flows;
pub mod health;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// The flow engine
    pub orchestrator: Arc<Orchestrator>,
    /// Registered executor names, for health reporting
    pub executors: Arc<Vec<String>>,
    /// Process start time
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create handler state around an orchestrator
    pub fn new(orchestrator: Arc<Orchestrator>, executors: Vec<String>) -> Self {
        Self {
            orchestrator,
            executors: Arc::new(executors),
            started_at: Utc::now(),
        }
    }
}

/// Build the router for API endpoints
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Flow journeys
        .route("/v1/flows", post(flows::start_flow_handler))
        .route("/v1/flows/:flow_id", get(flows::get_flow_handler))
        .route("/v1/flows/:flow_id/steps", post(flows::submit_step_handler))
        // Health check
        .route("/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
