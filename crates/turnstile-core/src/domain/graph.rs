use crate::types::{FlowType, GraphId, NodeId};
use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

/// An immutable, validated journey definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// ID of the graph
    pub id: GraphId,

    /// Purpose the graph serves
    pub flow_type: FlowType,

    /// Nodes in declaration order
    pub nodes: Vec<Node>,
}

/// One step of a journey
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// ID of the node, unique within its graph
    pub id: NodeId,

    /// What the node does
    pub kind: NodeKind,

    /// Inputs the node collects from the caller
    #[serde(default)]
    pub inputs: Vec<InputField>,

    /// Candidate successors, in declaration order
    #[serde(default)]
    pub next: Vec<NodeId>,

    /// Marks the entry node when it is not the first declared
    #[serde(default)]
    pub start: bool,
}

/// Node kinds. Only task nodes carry an executor binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Branches on the caller's chosen action
    Decision,
    /// Collects inputs without running any logic
    PromptOnly,
    /// Runs an executor, optionally after collecting inputs
    TaskExecution(ExecutorBinding),
    /// Terminal: the user is authenticated
    AuthenticationSuccess,
    /// Terminal: the journey is rejected
    AuthenticationFailure,
}

impl NodeKind {
    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Decision => "DECISION",
            NodeKind::PromptOnly => "PROMPT_ONLY",
            NodeKind::TaskExecution(_) => "TASK_EXECUTION",
            NodeKind::AuthenticationSuccess => "AUTHENTICATION_SUCCESS",
            NodeKind::AuthenticationFailure => "AUTHENTICATION_FAILURE",
        }
    }

    /// Whether reaching the node ends the journey
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            NodeKind::AuthenticationSuccess | NodeKind::AuthenticationFailure
        )
    }
}

/// Declared caller input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputField {
    /// Field name
    pub name: String,

    /// Expected JSON type
    #[serde(rename = "type")]
    pub input_type: InputType,

    /// Whether the field must be supplied before the node can proceed
    #[serde(default)]
    pub required: bool,
}

impl InputField {
    /// Convenience constructor
    pub fn new(name: impl Into<String>, input_type: InputType, required: bool) -> Self {
        Self {
            name: name.into(),
            input_type,
            required,
        }
    }
}

/// Primitive input types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// JSON string
    String,
    /// JSON number
    Number,
    /// JSON boolean
    Boolean,
}

impl InputType {
    /// Strict JSON type check, no coercion
    pub fn matches(&self, value: &serde_json::Value) -> bool {
        match self {
            InputType::String => value.is_string(),
            InputType::Number => value.is_number(),
            InputType::Boolean => value.is_boolean(),
        }
    }

    /// Wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::String => "string",
            InputType::Number => "number",
            InputType::Boolean => "boolean",
        }
    }
}

/// Binds a task node to a registered executor
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorBinding {
    /// Registry name of the executor
    pub name: String,

    /// Identity provider the executor talks to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idp_name: Option<String>,

    /// Opaque executor settings
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl ExecutorBinding {
    /// Binding with no IdP and no properties
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Node {
    /// Create a node with no inputs, successors or start mark
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: NodeId(id.into()),
            kind,
            inputs: Vec::new(),
            next: Vec::new(),
            start: false,
        }
    }

    /// Builder: add declared inputs
    pub fn with_inputs(mut self, inputs: Vec<InputField>) -> Self {
        self.inputs = inputs;
        self
    }

    /// Builder: set successors
    pub fn with_next(mut self, next: &[&str]) -> Self {
        self.next = next.iter().map(|id| NodeId(id.to_string())).collect();
        self
    }

    /// Builder: mark as the entry node
    pub fn as_start(mut self) -> Self {
        self.start = true;
        self
    }

    /// Names of required inputs
    pub fn required_inputs(&self) -> impl Iterator<Item = &InputField> {
        self.inputs.iter().filter(|field| field.required)
    }
}

impl Graph {
    /// Create a graph; call [`Graph::validate`] before using it
    pub fn new(id: impl Into<String>, flow_type: FlowType, nodes: Vec<Node>) -> Self {
        Self {
            id: GraphId(id.into()),
            flow_type,
            nodes,
        }
    }

    /// Look up a node by ID
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    /// The node a new session starts at
    pub fn start_node(&self) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|node| node.start)
            .or_else(|| self.nodes.first())
    }

    /// Check structural integrity, reporting every problem found
    pub fn validate(&self) -> Result<(), CoreError> {
        let issues = self.structural_issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(CoreError::GraphInvalid(format!(
                "graph '{}': {}",
                self.id,
                issues.join("; ")
            )))
        }
    }

    /// Every structural problem in the graph, in discovery order
    pub fn structural_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.nodes.is_empty() {
            issues.push("graph has no nodes".to_string());
            return issues;
        }

        let mut ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !ids.insert(&node.id) {
                issues.push(format!("duplicate node id '{}'", node.id));
            }
        }

        let starts = self.nodes.iter().filter(|node| node.start).count();
        if starts > 1 {
            issues.push(format!("{} nodes are marked as start", starts));
        }

        for node in &self.nodes {
            for target in &node.next {
                if !ids.contains(target) {
                    issues.push(format!(
                        "node '{}' references unknown node '{}'",
                        node.id, target
                    ));
                }
            }

            match &node.kind {
                NodeKind::Decision => {
                    if node.next.len() < 2 {
                        issues.push(format!(
                            "decision node '{}' needs at least two branches",
                            node.id
                        ));
                    }
                    if !node.inputs.is_empty() {
                        issues.push(format!("decision node '{}' cannot declare inputs", node.id));
                    }
                }
                NodeKind::PromptOnly => {
                    if node.next.len() != 1 {
                        issues.push(format!(
                            "prompt node '{}' must have exactly one next node",
                            node.id
                        ));
                    }
                }
                NodeKind::TaskExecution(binding) => {
                    if binding.name.trim().is_empty() {
                        issues.push(format!("task node '{}' has an empty executor name", node.id));
                    }
                    if node.next.is_empty() {
                        issues.push(format!("task node '{}' has no next node", node.id));
                    }
                }
                NodeKind::AuthenticationSuccess | NodeKind::AuthenticationFailure => {
                    if !node.next.is_empty() {
                        issues.push(format!(
                            "terminal node '{}' cannot have outgoing edges",
                            node.id
                        ));
                    }
                    if !node.inputs.is_empty() {
                        issues.push(format!("terminal node '{}' cannot declare inputs", node.id));
                    }
                }
            }

            let mut names = HashSet::new();
            for field in &node.inputs {
                if !names.insert(field.name.as_str()) {
                    issues.push(format!(
                        "node '{}' declares input '{}' twice",
                        node.id, field.name
                    ));
                }
            }
        }

        issues
    }

    /// Nodes that cannot be reached from the start node
    pub fn unreachable_nodes(&self) -> Vec<&NodeId> {
        let Some(start) = self.start_node() else {
            return Vec::new();
        };

        let mut seen: HashSet<&NodeId> = HashSet::new();
        let mut queue = VecDeque::from([&start.id]);
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = self.node(id) {
                queue.extend(node.next.iter());
            }
        }

        self.nodes
            .iter()
            .map(|node| &node.id)
            .filter(|id| !seen.contains(id))
            .collect()
    }
}
