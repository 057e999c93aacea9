//! Error types for the Turnstile Server

use thiserror::Error;
use turnstile_core::CoreError;
use turnstile_dsl::DslError;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A graph definition could not be loaded
    #[error("Graph definition error: {0}")]
    DefinitionError(#[from] DslError),

    /// The application registry could not be loaded
    #[error("Application registry error: {0}")]
    ApplicationRegistryError(String),

    /// Engine error during start-up
    #[error("Engine error: {0}")]
    EngineError(#[from] CoreError),

    /// Logging could not be initialised
    #[error("Telemetry error: {0}")]
    TelemetryError(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::InternalError(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::ApplicationRegistryError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for ServerError {
    fn from(err: serde_yaml::Error) -> Self {
        ServerError::ApplicationRegistryError(format!("YAML error: {}", err))
    }
}

impl From<config::ConfigError> for ServerError {
    fn from(err: config::ConfigError) -> Self {
        ServerError::ConfigError(err.to_string())
    }
}
