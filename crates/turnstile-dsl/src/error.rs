use thiserror::Error;
use crate::validation::ValidationError;
use std::fmt;
use turnstile_core::CoreError;

/// All possible errors that can occur while loading graph definitions
#[derive(Error, Debug)]
pub enum DslError {
    /// Errors that occur during YAML parsing
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Errors that occur during JSON processing
    #[error("JSON processing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A single validation error
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    /// Multiple validation errors
    #[error("{}", MultipleErrorsFormat(.0))]
    MultipleValidationErrors(Vec<ValidationError>),

    /// File could not be read
    #[error("I/O error reading {path}: {message}")]
    IoError {
        /// File or directory involved
        path: String,
        /// Underlying error
        message: String,
    },

    /// File extension is not one of json, yaml or yml
    #[error("Unsupported definition format: {0}")]
    UnsupportedFormat(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

// Helper struct to format multiple errors
struct MultipleErrorsFormat<'a>(&'a [ValidationError]);

impl fmt::Display for MultipleErrorsFormat<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multiple validation errors ({} issues):", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            write!(f, "\n  {}. {}", i + 1, err)?;
        }
        Ok(())
    }
}

impl DslError {
    /// Create a DslError from a vector of validation errors
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        let mut errors = errors;
        match errors.len() {
            0 => DslError::InternalError("Called from_validation_errors with empty vector".to_string()),
            1 => DslError::ValidationError(errors.remove(0)),
            _ => DslError::MultipleValidationErrors(errors),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DslError::YamlError(_) => "ERR_DSL_YAML_PARSE",
            DslError::JsonError(_) => "ERR_DSL_JSON_PARSE",
            DslError::ValidationError(err) => err.code,
            DslError::MultipleValidationErrors(_) => "ERR_DSL_VALIDATION_MULTIPLE",
            DslError::IoError { .. } => "ERR_DSL_IO",
            DslError::UnsupportedFormat(_) => "ERR_DSL_UNSUPPORTED_FORMAT",
            DslError::InternalError(_) => "ERR_DSL_INTERNAL",
        }
    }

    /// Every validation error carried, if any
    pub fn validation_errors(&self) -> Vec<&ValidationError> {
        match self {
            DslError::ValidationError(err) => vec![err],
            DslError::MultipleValidationErrors(errors) => errors.iter().collect(),
            _ => Vec::new(),
        }
    }
}

impl From<DslError> for CoreError {
    fn from(err: DslError) -> Self {
        match err {
            DslError::IoError { .. } | DslError::UnsupportedFormat(_) => {
                CoreError::ConfigurationError(err.to_string())
            }
            other => CoreError::GraphInvalid(other.to_string()),
        }
    }
}
