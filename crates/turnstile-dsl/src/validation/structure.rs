use std::collections::HashSet;
use crate::document::{node_types, GraphDocument, NodeDocument};
use crate::validation::{ValidationError, error_codes, Validator};

const GRAPH_TYPES: [&str; 2] = ["AUTHENTICATION", "REGISTRATION"];
const INPUT_TYPES: [&str; 3] = ["string", "number", "boolean"];

/// Validates the shape of each node against its kind:
/// - known graph, node and input types
/// - unique node IDs and input names
/// - executor bindings and inputs only where the kind allows them
/// - successor counts per kind
/// - at most one start node
pub struct StructureValidator;

impl StructureValidator {
    /// Create a new structure validator
    pub fn new() -> Self {
        StructureValidator
    }

    fn validate_node(&self, node: &NodeDocument, path: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !node_types::ALL.contains(&node.node_type.as_str()) {
            errors.push(ValidationError::at(
                error_codes::INVALID_NODE_TYPE,
                format!(
                    "Node '{}' has unknown type '{}'. Expected one of: {}",
                    node.id,
                    node.node_type,
                    node_types::ALL.join(", ")
                ),
                format!("{}.type", path),
            ));
            // Kind-specific checks are meaningless for an unknown kind
            return errors;
        }

        errors.extend(self.validate_inputs(node, path));

        let kind = node.node_type.as_str();
        let terminal = node_types::is_terminal(kind);

        match (kind == node_types::TASK_EXECUTION, &node.executor) {
            (true, None) => errors.push(ValidationError::at(
                error_codes::MISSING_EXECUTOR,
                format!("Task node '{}' must declare an executor", node.id),
                format!("{}.executor", path),
            )),
            (true, Some(executor)) if executor.name.trim().is_empty() => {
                errors.push(ValidationError::at(
                    error_codes::MISSING_EXECUTOR,
                    format!("Task node '{}' has an empty executor name", node.id),
                    format!("{}.executor.name", path),
                ))
            }
            (false, Some(_)) => errors.push(ValidationError::at(
                error_codes::UNEXPECTED_EXECUTOR,
                format!("{} node '{}' cannot declare an executor", kind, node.id),
                format!("{}.executor", path),
            )),
            _ => {}
        }

        if (terminal || kind == node_types::DECISION) && !node.input_data.is_empty() {
            errors.push(ValidationError::at(
                error_codes::UNEXPECTED_INPUTS,
                format!("{} node '{}' cannot declare inputData", kind, node.id),
                format!("{}.inputData", path),
            ));
        }

        let branching = match kind {
            node_types::DECISION if node.next.len() < 2 => {
                Some(format!("Decision node '{}' needs at least two next nodes", node.id))
            }
            node_types::PROMPT_ONLY if node.next.len() != 1 => {
                Some(format!("Prompt node '{}' needs exactly one next node", node.id))
            }
            node_types::TASK_EXECUTION if node.next.is_empty() => {
                Some(format!("Task node '{}' needs at least one next node", node.id))
            }
            _ if terminal && !node.next.is_empty() => {
                Some(format!("Terminal node '{}' cannot have next nodes", node.id))
            }
            _ => None,
        };
        if let Some(message) = branching {
            errors.push(ValidationError::at(
                error_codes::INVALID_BRANCHING,
                message,
                format!("{}.next", path),
            ));
        }

        errors
    }

    fn validate_inputs(&self, node: &NodeDocument, path: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut names = HashSet::new();

        for (idx, input) in node.input_data.iter().enumerate() {
            let input_path = format!("{}.inputData[{}]", path, idx);

            if !names.insert(input.name.as_str()) {
                errors.push(ValidationError::at(
                    error_codes::DUPLICATE_INPUT,
                    format!("Node '{}' declares input '{}' more than once", node.id, input.name),
                    format!("{}.name", input_path),
                ));
            }

            if !INPUT_TYPES.contains(&input.input_type.as_str()) {
                errors.push(ValidationError::at(
                    error_codes::INVALID_INPUT_TYPE,
                    format!(
                        "Input '{}' has unknown type '{}'. Expected one of: {}",
                        input.name,
                        input.input_type,
                        INPUT_TYPES.join(", ")
                    ),
                    format!("{}.type", input_path),
                ));
            }
        }

        errors
    }
}

impl Validator for StructureValidator {
    fn validate(&self, document: &GraphDocument) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !GRAPH_TYPES.contains(&document.graph_type.as_str()) {
            errors.push(ValidationError::at(
                error_codes::INVALID_GRAPH_TYPE,
                format!(
                    "Graph '{}' has unknown type '{}'. Expected one of: {}",
                    document.id,
                    document.graph_type,
                    GRAPH_TYPES.join(", ")
                ),
                "type",
            ));
        }

        if document.nodes.is_empty() {
            errors.push(ValidationError::at(
                error_codes::EMPTY_GRAPH,
                format!("Graph '{}' declares no nodes", document.id),
                "nodes",
            ));
            return errors;
        }

        let mut ids = HashSet::with_capacity(document.nodes.len());
        let mut start_nodes = Vec::new();

        for (idx, node) in document.nodes.iter().enumerate() {
            let path = format!("nodes[{}]", idx);

            if !ids.insert(node.id.as_str()) {
                errors.push(ValidationError::at(
                    error_codes::DUPLICATE_ID,
                    format!("Duplicate node ID '{}'", node.id),
                    format!("{}.id", path),
                ));
            }

            if node.start {
                start_nodes.push(node.id.as_str());
            }

            errors.extend(self.validate_node(node, &path));
        }

        if start_nodes.len() > 1 {
            errors.push(ValidationError::at(
                error_codes::MULTIPLE_START_NODES,
                format!("Only one node may be marked start, found: {}", start_nodes.join(", ")),
                "nodes",
            ));
        }

        errors
    }
}
