use std::fmt;
use std::error::Error;
use crate::document::GraphDocument;
use crate::error::DslError;

mod reference;
mod schema;
mod structure;

pub use schema::SchemaValidator;

/// Represents a validation error that occurred while checking a graph definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error code (should be a constant identifier)
    pub code: &'static str,

    /// Human-readable error message
    pub message: String,

    /// Optional path to the location of the error (e.g., "nodes[2].next[0]")
    pub path: Option<String>,
}

impl ValidationError {
    /// Create an error located at `path`
    pub fn at(code: &'static str, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: Some(path.into()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}: {} (at {})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl Error for ValidationError {}

/// Validation error codes
pub mod error_codes {
    /// Document shape does not match the graph schema
    pub const SCHEMA_VIOLATION: &str = "ERR_DSL_VALIDATION_SCHEMA";

    /// Graph declares no nodes
    pub const EMPTY_GRAPH: &str = "ERR_DSL_VALIDATION_EMPTY_GRAPH";

    /// Unknown graph type
    pub const INVALID_GRAPH_TYPE: &str = "ERR_DSL_VALIDATION_INVALID_GRAPH_TYPE";

    /// Unknown node type
    pub const INVALID_NODE_TYPE: &str = "ERR_DSL_VALIDATION_INVALID_NODE_TYPE";

    /// Unknown input type
    pub const INVALID_INPUT_TYPE: &str = "ERR_DSL_VALIDATION_INVALID_INPUT_TYPE";

    /// Duplicate ID found
    pub const DUPLICATE_ID: &str = "ERR_DSL_VALIDATION_DUPLICATE_ID";

    /// Duplicate input name within a node
    pub const DUPLICATE_INPUT: &str = "ERR_DSL_VALIDATION_DUPLICATE_INPUT";

    /// Invalid reference to another node
    pub const INVALID_REFERENCE: &str = "ERR_DSL_VALIDATION_INVALID_REFERENCE";

    /// Wrong number of successors for the node kind
    pub const INVALID_BRANCHING: &str = "ERR_DSL_VALIDATION_INVALID_BRANCHING";

    /// More than one node marked as start
    pub const MULTIPLE_START_NODES: &str = "ERR_DSL_VALIDATION_MULTIPLE_START_NODES";

    /// Task node without executor binding
    pub const MISSING_EXECUTOR: &str = "ERR_DSL_VALIDATION_MISSING_EXECUTOR";

    /// Executor binding on a node kind that cannot run one
    pub const UNEXPECTED_EXECUTOR: &str = "ERR_DSL_VALIDATION_UNEXPECTED_EXECUTOR";

    /// Inputs declared on a node kind that cannot collect them
    pub const UNEXPECTED_INPUTS: &str = "ERR_DSL_VALIDATION_UNEXPECTED_INPUTS";

    /// Node cannot be reached from the start node (warning)
    pub const UNREACHABLE_NODE: &str = "WARN_DSL_VALIDATION_UNREACHABLE_NODE";
}

/// A trait for validators that check specific aspects of a graph document
pub trait Validator {
    /// Validate the document and return a list of validation errors (if any)
    fn validate(&self, document: &GraphDocument) -> Vec<ValidationError>;
}

/// Validate a parsed graph document.
///
/// Returns the non-fatal warnings on success.
pub fn validate_document(document: &GraphDocument) -> Result<Vec<ValidationError>, DslError> {
    let validators: Vec<Box<dyn Validator>> = vec![
        Box::new(structure::StructureValidator::new()),
        Box::new(reference::ReferenceValidator::new()),
    ];

    // Run all validators and collect errors
    let mut errors = Vec::new();

    for validator in validators {
        let validator_errors = validator.validate(document);
        errors.extend(validator_errors);
    }

    if !errors.is_empty() {
        return Err(DslError::from_validation_errors(errors));
    }

    Ok(reference::ReferenceValidator::new().unreachable(document))
}
