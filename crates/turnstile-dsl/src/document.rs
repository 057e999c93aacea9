use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A graph definition exactly as written in a JSON or YAML file.
/// Kind and type names stay strings until validation so bad values can be
/// reported with their location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Unique graph ID
    pub id: String,

    /// `AUTHENTICATION` or `REGISTRATION`
    #[serde(rename = "type")]
    pub graph_type: String,

    /// Nodes in declaration order
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
}

/// A node as written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDocument {
    /// Node ID
    pub id: String,

    /// Node kind name
    #[serde(rename = "type")]
    pub node_type: String,

    /// Declared inputs
    #[serde(default)]
    pub input_data: Vec<InputDocument>,

    /// Executor binding
    #[serde(default)]
    pub executor: Option<ExecutorDocument>,

    /// Successor node IDs
    #[serde(default)]
    pub next: Vec<String>,

    /// Entry node marker
    #[serde(default)]
    pub start: bool,
}

/// An input field as written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDocument {
    /// Field name
    pub name: String,

    /// `string`, `number` or `boolean`
    #[serde(rename = "type")]
    pub input_type: String,

    /// Whether the field is mandatory
    #[serde(default)]
    pub required: bool,
}

/// An executor binding as written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorDocument {
    /// Registered executor name
    pub name: String,

    /// Identity provider name
    #[serde(default)]
    pub idp_name: Option<String>,

    /// Opaque settings
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

/// Node kind names accepted in definitions
pub mod node_types {
    /// Branch on the caller's choice
    pub const DECISION: &str = "DECISION";
    /// Collect inputs only
    pub const PROMPT_ONLY: &str = "PROMPT_ONLY";
    /// Run an executor
    pub const TASK_EXECUTION: &str = "TASK_EXECUTION";
    /// Success terminal
    pub const AUTHENTICATION_SUCCESS: &str = "AUTHENTICATION_SUCCESS";
    /// Failure terminal
    pub const AUTHENTICATION_FAILURE: &str = "AUTHENTICATION_FAILURE";

    /// All accepted names
    pub const ALL: [&str; 5] = [
        DECISION,
        PROMPT_ONLY,
        TASK_EXECUTION,
        AUTHENTICATION_SUCCESS,
        AUTHENTICATION_FAILURE,
    ];

    /// Whether the kind ends a journey
    pub fn is_terminal(node_type: &str) -> bool {
        node_type == AUTHENTICATION_SUCCESS || node_type == AUTHENTICATION_FAILURE
    }
}
