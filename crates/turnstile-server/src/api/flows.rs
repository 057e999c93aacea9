//! Flow endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use turnstile_core::{
    ApplicationId, CoreError, FlowId, FlowResponse, FlowStatus, FlowType, Prompt, StepInput,
};

use super::errors::ApiError;
use super::AppState;

/// Body of `POST /v1/flows`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartFlowRequest {
    pub application_id: ApplicationId,
    #[serde(default = "default_flow_type")]
    pub flow_type: FlowType,
}

fn default_flow_type() -> FlowType {
    FlowType::Authentication
}

/// Body of `GET /v1/flows/:flow_id`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    pub flow_id: FlowId,
    pub flow_status: FlowStatus,
    pub flow_type: FlowType,
    pub current_node_id: String,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Prompt>,
}

/// Start a journey
pub async fn start_flow_handler(
    State(state): State<AppState>,
    Json(request): Json<StartFlowRequest>,
) -> Result<(StatusCode, Json<FlowResponse>), ApiError> {
    info!(
        application_id = %request.application_id,
        flow_type = %request.flow_type,
        "Flow start requested"
    );

    let response = state
        .orchestrator
        .start_flow(&request.application_id, request.flow_type)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Submit one step of a journey
pub async fn submit_step_handler(
    State(state): State<AppState>,
    Path(flow_id): Path<String>,
    Json(input): Json<StepInput>,
) -> Result<Json<FlowResponse>, ApiError> {
    let flow_id = FlowId(flow_id);
    debug!(flow_id = %flow_id, "Step submitted");

    match state.orchestrator.submit_step(&flow_id, input).await {
        Ok(response) => Ok(Json(response)),
        Err(err @ CoreError::InputValidation(_)) | Err(err @ CoreError::InvalidSelection { .. }) => {
            Err(reprompt(&state, flow_id, err).await)
        }
        Err(err) => Err(ApiError::Flow(err)),
    }
}

/// Current state of a journey
pub async fn get_flow_handler(
    State(state): State<AppState>,
    Path(flow_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let flow_id = FlowId(flow_id);
    let session = state.orchestrator.get_session(&flow_id).await?;

    let prompt = if session.is_active() {
        Some(state.orchestrator.current_prompt(&flow_id).await?)
    } else {
        None
    };

    Ok(Json(FlowSummary {
        flow_id: session.flow_id,
        flow_status: session.status,
        flow_type: session.flow_type,
        current_node_id: session.current_node_id.0,
        expires_at: session.expires_at,
        prompt,
    }))
}

/// Attach the node's prompt to a rejected submission so the caller can retry
async fn reprompt(state: &AppState, flow_id: FlowId, err: CoreError) -> ApiError {
    match state.orchestrator.current_prompt(&flow_id).await {
        Ok(prompt) => {
            let prompt = match &err {
                CoreError::InputValidation(violations) => prompt.with_violations(violations.clone()),
                _ => prompt,
            };
            ApiError::Reprompt {
                error: err,
                flow_id,
                prompt,
            }
        }
        Err(_) => ApiError::Flow(err),
    }
}
