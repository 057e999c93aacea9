use std::collections::{HashMap, HashSet, VecDeque};
use crate::document::GraphDocument;
use crate::validation::{ValidationError, error_codes, Validator};

/// Validates node references:
/// - every `next` entry names a declared node
/// - reachability from the start node (reported as warnings)
pub struct ReferenceValidator;

impl ReferenceValidator {
    /// Create a new reference validator
    pub fn new() -> Self {
        ReferenceValidator
    }

    /// Nodes that no path from the start node reaches.
    ///
    /// The start node is the one marked `start`, otherwise the first node.
    pub fn unreachable(&self, document: &GraphDocument) -> Vec<ValidationError> {
        let Some(start) = document
            .nodes
            .iter()
            .find(|n| n.start)
            .or_else(|| document.nodes.first())
        else {
            return Vec::new();
        };

        let by_id: HashMap<&str, &[String]> = document
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n.next.as_slice()))
            .collect();

        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue = VecDeque::from([start.id.as_str()]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(next) = by_id.get(id) {
                queue.extend(next.iter().map(String::as_str));
            }
        }

        document
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !seen.contains(n.id.as_str()))
            .map(|(idx, n)| {
                ValidationError::at(
                    error_codes::UNREACHABLE_NODE,
                    format!("Node '{}' cannot be reached from start node '{}'", n.id, start.id),
                    format!("nodes[{}]", idx),
                )
            })
            .collect()
    }
}

impl Validator for ReferenceValidator {
    fn validate(&self, document: &GraphDocument) -> Vec<ValidationError> {
        let ids: HashSet<&str> = document.nodes.iter().map(|n| n.id.as_str()).collect();
        let mut errors = Vec::new();

        for (node_idx, node) in document.nodes.iter().enumerate() {
            for (next_idx, target) in node.next.iter().enumerate() {
                if !ids.contains(target.as_str()) {
                    errors.push(ValidationError::at(
                        error_codes::INVALID_REFERENCE,
                        format!(
                            "Node '{}' points to non-existent node '{}'",
                            node.id, target
                        ),
                        format!("nodes[{}].next[{}]", node_idx, next_idx),
                    ));
                }
            }
        }

        errors
    }
}
