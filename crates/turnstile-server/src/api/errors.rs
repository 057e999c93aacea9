//! Error responses for the flow API
//!
//! Caller errors carry their full message. Internal errors are logged here
//! and the caller only sees a generic message plus the stable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{error, warn};

use turnstile_core::{CoreError, FlowId, Prompt};

/// Message shown for every internal error
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// API error type
#[derive(Debug)]
pub enum ApiError {
    /// Engine error
    Flow(CoreError),
    /// A rejected submission; the caller is shown the same node again
    Reprompt {
        /// Validation or selection error
        error: CoreError,
        /// Flow the submission was for
        flow_id: FlowId,
        /// The prompt to answer, with violations attached
        prompt: Prompt,
    },
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Flow(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Flow(err) => write!(f, "{}", err),
            ApiError::Reprompt { error, .. } => write!(f, "{}", error),
        }
    }
}

/// HTTP status for an engine error
pub fn status_for(err: &CoreError) -> StatusCode {
    match err {
        CoreError::ApplicationNotFound(_) | CoreError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        CoreError::SessionExpired(_) => StatusCode::GONE,
        CoreError::InvalidSessionState(_) | CoreError::Conflict(_) => StatusCode::CONFLICT,
        CoreError::InputValidation(_) | CoreError::InvalidSelection { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        CoreError::RetryLimitExceeded(_) | CoreError::ExecutionDenied(_) => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_body(err: &CoreError) -> Value {
    let message = if err.is_internal() {
        INTERNAL_ERROR_MESSAGE.to_string()
    } else {
        err.to_string()
    };

    let mut body = json!({
        "error": message,
        "errorDetails": {
            "errorCode": err.error_code(),
            "errorMessage": message,
        }
    });

    match err {
        CoreError::InputValidation(violations) => {
            body["errorDetails"]["violations"] = json!(violations);
        }
        CoreError::InvalidSelection { options, .. } => {
            body["errorDetails"]["options"] = json!(options);
        }
        _ => {}
    }

    body
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Flow(err) => {
                if err.is_internal() {
                    error!(error = %err, error_code = err.error_code(), "Flow request failed");
                } else {
                    warn!(error = %err, error_code = err.error_code(), "Flow request rejected");
                }
                (status_for(&err), Json(error_body(&err))).into_response()
            }
            ApiError::Reprompt {
                error,
                flow_id,
                prompt,
            } => {
                let mut body = error_body(&error);
                body["flowId"] = json!(flow_id);
                body["prompt"] = json!(prompt);
                (status_for(&error), Json(body)).into_response()
            }
        }
    }
}
