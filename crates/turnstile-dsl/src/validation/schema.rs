use jsonschema::JSONSchema;
use lazy_static::lazy_static;
use serde_json::{json, Value};
use crate::validation::{ValidationError, error_codes};

lazy_static! {
    /// Shape every graph definition must have before it is deserialized
    static ref GRAPH_SCHEMA: Value = json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "required": ["id", "type", "nodes"],
        "properties": {
            "id": { "type": "string", "minLength": 1 },
            "type": { "type": "string" },
            "nodes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "type"],
                    "properties": {
                        "id": { "type": "string", "minLength": 1 },
                        "type": { "type": "string" },
                        "start": { "type": "boolean" },
                        "next": {
                            "type": "array",
                            "items": { "type": "string" }
                        },
                        "inputData": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["name", "type"],
                                "properties": {
                                    "name": { "type": "string", "minLength": 1 },
                                    "type": { "type": "string" },
                                    "required": { "type": "boolean" }
                                }
                            }
                        },
                        "executor": {
                            "type": "object",
                            "required": ["name"],
                            "properties": {
                                "name": { "type": "string" },
                                "idpName": { "type": ["string", "null"] },
                                "properties": {
                                    "type": "object",
                                    "additionalProperties": { "type": "string" }
                                }
                            }
                        }
                    }
                }
            }
        }
    });
}

/// Checks raw definition values against the graph JSON schema.
///
/// Runs before deserialization so shape problems carry a JSON pointer
/// instead of a serde message.
pub struct SchemaValidator {
    compiled: JSONSchema,
}

impl SchemaValidator {
    /// Compile the graph schema
    pub fn new() -> Result<Self, ValidationError> {
        let compiled = JSONSchema::compile(&GRAPH_SCHEMA).map_err(|e| ValidationError {
            code: error_codes::SCHEMA_VIOLATION,
            message: format!("Graph schema failed to compile: {}", e),
            path: None,
        })?;
        Ok(Self { compiled })
    }

    /// Every schema violation in `value`
    pub fn validate(&self, value: &Value) -> Vec<ValidationError> {
        match self.compiled.validate(value) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|e| {
                    let pointer = e.instance_path.to_string();
                    ValidationError {
                        code: error_codes::SCHEMA_VIOLATION,
                        message: e.to_string(),
                        path: Some(if pointer.is_empty() { "/".to_string() } else { pointer }),
                    }
                })
                .collect(),
        }
    }
}
