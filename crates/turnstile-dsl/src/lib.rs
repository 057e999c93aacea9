//! # Turnstile DSL
//!
//! Graph definitions for the Turnstile flow engine are written as JSON or YAML
//! documents. This crate parses them, validates their shape and structure and
//! converts them into the core [`Graph`] model.
//!
//! ## Features
//!
//! * JSON and YAML definitions with the same shape
//! * JSON-schema check of the raw document before deserialization
//! * Structural validation that reports every violation with its location
//! * Unreachable nodes reported as warnings
//! * Directory loading for start-up
//!
//! ## Example
//!
//! ```
//! use turnstile_dsl::parse_graph_yaml;
//!
//! let yaml = r#"
//! id: basic-login
//! type: AUTHENTICATION
//! nodes:
//!   - id: credentials
//!     type: TASK_EXECUTION
//!     inputData:
//!       - name: username
//!         type: string
//!         required: true
//!       - name: password
//!         type: string
//!         required: true
//!     executor:
//!       name: BasicAuthExecutor
//!     next: [done]
//!   - id: done
//!     type: AUTHENTICATION_SUCCESS
//! "#;
//!
//! let graph = parse_graph_yaml(yaml).unwrap();
//! assert_eq!(graph.nodes.len(), 2);
//! ```

mod convert;
mod error;
mod loader;
mod parser;

pub mod document;
pub mod validation;

use tracing::warn;
use turnstile_core::Graph;

pub use document::GraphDocument;
pub use error::DslError;
pub use loader::{load_graph_file, load_graphs_from_dir};
pub use parser::Format;
pub use validation::ValidationError;

/// Parse and validate a graph definition.
///
/// This function performs, in order:
/// 1. Parsing the text into a generic value and checking it against the graph schema
/// 2. Structural and reference validation, collecting every violation
/// 3. Conversion into the core [`Graph`]
///
/// Unreachable nodes do not fail the parse; they are logged as warnings.
///
/// # Errors
///
/// * Invalid JSON or YAML syntax
/// * Missing or mistyped fields
/// * Validation errors (unknown kinds, dangling references, bad branching)
///
/// # Examples
///
/// ```
/// use turnstile_dsl::{parse_graph, Format};
///
/// let json = r#"{
///   "id": "broken",
///   "type": "AUTHENTICATION",
///   "nodes": [
///     { "id": "ask", "type": "PROMPT_ONLY", "next": ["nowhere"] }
///   ]
/// }"#;
///
/// let err = parse_graph(json, Format::Json).unwrap_err();
/// assert!(err.error_code().contains("INVALID_REFERENCE"));
/// ```
pub fn parse_graph(text: &str, format: Format) -> Result<Graph, DslError> {
    let document = parser::parse_graph_document(text, format)?;

    let warnings = validation::validate_document(&document)?;
    for warning in &warnings {
        warn!(graph_id = %document.id, code = warning.code, "{}", warning.message);
    }

    convert::into_graph(document)
}

/// Parse and validate a JSON graph definition
pub fn parse_graph_json(text: &str) -> Result<Graph, DslError> {
    parse_graph(text, Format::Json)
}

/// Parse and validate a YAML graph definition
pub fn parse_graph_yaml(text: &str) -> Result<Graph, DslError> {
    parse_graph(text, Format::Yaml)
}

/// Returns a version string for the Turnstile DSL crate
///
/// # Examples
///
/// ```
/// use turnstile_dsl::version;
///
/// let ver = version();
/// assert!(ver.starts_with("0."));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
