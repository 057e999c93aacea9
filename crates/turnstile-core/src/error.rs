use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single problem found while checking a submission against a node's declared inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputViolation {
    /// Name of the offending input field
    pub field: String,
    /// Human-readable description of the problem
    pub message: String,
}

impl InputViolation {
    /// Create a new violation for a field
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Core error type for the Turnstile flow engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Graph not found
    #[error("Graph not found: {0}")]
    GraphNotFound(String),

    /// Graph failed structural validation
    #[error("Graph invalid: {0}")]
    GraphInvalid(String),

    /// Application not found
    #[error("Application not found: {0}")]
    ApplicationNotFound(String),

    /// Flow session not found
    #[error("Flow session not found: {0}")]
    SessionNotFound(String),

    /// Flow session is past its expiry
    #[error("Flow session expired: {0}")]
    SessionExpired(String),

    /// Flow session is not in a state that accepts submissions
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),

    /// Concurrent modification of a flow session
    #[error("Conflict: {0}")]
    Conflict(String),

    /// One or more inputs failed validation
    #[error("Input validation failed: {}", format_violations(.0))]
    InputValidation(Vec<InputViolation>),

    /// The chosen action is not one of the node's branches
    #[error("Invalid selection {selected:?}; expected one of [{}]", .options.join(", "))]
    InvalidSelection {
        /// What the caller chose, if anything
        selected: Option<String>,
        /// Branches the caller may choose from
        options: Vec<String>,
    },

    /// Recoverable failures exceeded the configured bound
    #[error("Retry limit exceeded: {0}")]
    RetryLimitExceeded(String),

    /// An executor refused the journey outright
    #[error("Execution denied: {0}")]
    ExecutionDenied(String),

    /// No executor registered under the given name
    #[error("Executor not registered: {0}")]
    ExecutorNotRegistered(String),

    /// An executor returned a result the graph cannot route
    #[error("Executor contract violation: {0}")]
    ExecutorContractViolation(String),

    /// An executor raised an error
    #[error("Executor failure: {0}")]
    ExecutorFailure(String),

    /// State store error
    #[error("State store error: {0}")]
    StateStoreError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

fn format_violations(violations: &[InputViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl CoreError {
    /// Stable code reported to callers and logs
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::GraphNotFound(_) => "FLW-1001",
            CoreError::GraphInvalid(_) => "FLW-1002",
            CoreError::ApplicationNotFound(_) => "FLW-2001",
            CoreError::SessionNotFound(_) => "FLW-2002",
            CoreError::SessionExpired(_) => "FLW-2003",
            CoreError::InvalidSessionState(_) => "FLW-2004",
            CoreError::Conflict(_) => "FLW-2005",
            CoreError::InputValidation(_) => "FLW-3001",
            CoreError::InvalidSelection { .. } => "FLW-3002",
            CoreError::RetryLimitExceeded(_) => "FLW-4001",
            CoreError::ExecutionDenied(_) => "FLW-4002",
            CoreError::ExecutorNotRegistered(_) => "FLW-5001",
            CoreError::ExecutorContractViolation(_) => "FLW-5002",
            CoreError::ExecutorFailure(_) => "FLW-5003",
            CoreError::StateStoreError(_) => "FLW-5004",
            CoreError::SerializationError(_) => "FLW-5005",
            CoreError::ConfigurationError(_) => "FLW-5006",
            CoreError::Other(_) => "FLW-5007",
        }
    }

    /// Whether details of this error must stay server-side
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            CoreError::GraphNotFound(_)
                | CoreError::GraphInvalid(_)
                | CoreError::ExecutorNotRegistered(_)
                | CoreError::ExecutorContractViolation(_)
                | CoreError::ExecutorFailure(_)
                | CoreError::StateStoreError(_)
                | CoreError::SerializationError(_)
                | CoreError::ConfigurationError(_)
                | CoreError::Other(_)
        )
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<String> for CoreError {
    fn from(err: String) -> Self {
        CoreError::Other(err)
    }
}

impl From<&str> for CoreError {
    fn from(err: &str) -> Self {
        CoreError::Other(err.to_string())
    }
}
