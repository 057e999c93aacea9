use std::path::Path;
use serde_json::Value;
use crate::document::GraphDocument;
use crate::error::DslError;
use crate::validation::SchemaValidator;

/// Source format of a graph definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON text
    Json,
    /// YAML text
    Yaml,
}

impl Format {
    /// Detect the format from a file extension (`json`, `yaml` or `yml`)
    pub fn from_path(path: &Path) -> Result<Self, DslError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Ok(Format::Yaml)
            }
            _ => Err(DslError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Parse definition text into a GraphDocument.
///
/// The text is first read into a generic value and checked against the graph
/// schema, so a malformed document reports every shape problem at once.
/// Semantic validation is handled separately by the validation module.
pub fn parse_graph_document(text: &str, format: Format) -> Result<GraphDocument, DslError> {
    let value: Value = match format {
        Format::Json => serde_json::from_str(text)?,
        Format::Yaml => serde_yaml::from_str(text)?,
    };

    let violations = SchemaValidator::new()?.validate(&value);
    if !violations.is_empty() {
        return Err(DslError::from_validation_errors(violations));
    }

    Ok(serde_json::from_value(value)?)
}
