use crate::{
    domain::flow_session::{FlowSession, FlowStatus},
    domain::graph::{InputField, Node, NodeKind},
    types::{AuthenticatedUser, FlowId, ValueMap},
    InputViolation,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What the caller submits for one step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepInput {
    /// Values for declared input fields
    #[serde(default)]
    pub inputs: ValueMap,

    /// Branch chosen at a decision node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl StepInput {
    /// Submission carrying only inputs
    pub fn with_inputs(inputs: ValueMap) -> Self {
        Self {
            inputs,
            action: None,
        }
    }

    /// Submission carrying only a decision
    pub fn with_action(action: impl Into<String>) -> Self {
        Self {
            inputs: ValueMap::new(),
            action: Some(action.into()),
        }
    }
}

/// Kind of response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseType {
    /// The journey waits on the caller
    Prompt,
    /// The journey ended
    Complete,
}

/// Response to `start_flow` and `submit_step`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowResponse {
    /// The flow session
    pub flow_id: FlowId,

    /// Session status after the call
    pub flow_status: FlowStatus,

    /// Prompt or terminal result
    #[serde(rename = "type")]
    pub response_type: ResponseType,

    /// Present when the journey waits on the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<Prompt>,

    /// Present when the journey ended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TerminalResult>,
}

/// What the caller must do next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    /// Node waiting on the caller
    pub node_id: String,

    /// Wire name of the node kind
    pub node_type: String,

    /// Fields to supply
    #[serde(default)]
    pub inputs: Vec<InputField>,

    /// Branches to choose from at a decision node
    #[serde(default)]
    pub actions: Vec<String>,

    /// Executor-provided data such as a redirect URL
    #[serde(default)]
    pub additional_data: HashMap<String, String>,

    /// Problems with the previous submission
    #[serde(default)]
    pub violations: Vec<InputViolation>,

    /// User-facing reason the previous attempt failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl Prompt {
    /// Prompt describing a node's declared inputs or branches
    pub fn for_node(node: &Node) -> Self {
        let actions = match node.kind {
            NodeKind::Decision => node.next.iter().map(|id| id.0.clone()).collect(),
            _ => Vec::new(),
        };

        Self {
            node_id: node.id.0.clone(),
            node_type: node.kind.as_str().to_string(),
            inputs: node.inputs.clone(),
            actions,
            additional_data: HashMap::new(),
            violations: Vec::new(),
            failure_reason: None,
        }
    }

    /// Only ask for fields not already collected
    pub fn outstanding(mut self, collected: &ValueMap) -> Self {
        self.inputs.retain(|field| !is_present(collected.get(&field.name)));
        self
    }

    /// Attach violations from the previous submission
    pub fn with_violations(mut self, violations: Vec<InputViolation>) -> Self {
        self.violations = violations;
        self
    }
}

/// Whether a submitted value counts as supplied
pub(crate) fn is_present(value: Option<&serde_json::Value>) -> bool {
    match value {
        None | Some(serde_json::Value::Null) => false,
        Some(serde_json::Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// How the journey ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// The user is authenticated
    Success,
    /// The journey was rejected
    Failure,
}

/// Final outcome of a journey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalResult {
    /// Success or failure
    pub outcome: Outcome,

    /// Authenticated user on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthenticatedUser>,

    /// Accumulated attributes on success
    #[serde(default)]
    pub attributes: ValueMap,

    /// Stable error code on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,

    /// Generic failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FlowResponse {
    /// Response for a session waiting on the caller
    pub fn prompt(session: &FlowSession, prompt: Prompt) -> Self {
        Self {
            flow_id: session.flow_id.clone(),
            flow_status: session.status,
            response_type: ResponseType::Prompt,
            prompt: Some(prompt),
            result: None,
        }
    }

    /// Response for a session that reached a terminal state
    pub fn terminal(session: &FlowSession, message: Option<String>) -> Self {
        let result = match session.status {
            FlowStatus::Completed => TerminalResult {
                outcome: Outcome::Success,
                user: session.authenticated_user.clone(),
                attributes: session.attributes.clone(),
                error_code: None,
                message: None,
            },
            _ => TerminalResult {
                outcome: Outcome::Failure,
                user: None,
                attributes: ValueMap::new(),
                error_code: session.failure_code.clone(),
                message: Some(message.unwrap_or_else(|| "Authentication failed".to_string())),
            },
        };

        Self {
            flow_id: session.flow_id.clone(),
            flow_status: session.status,
            response_type: ResponseType::Complete,
            prompt: None,
            result: Some(result),
        }
    }

    /// Whether the journey ended
    pub fn is_complete(&self) -> bool {
        self.response_type == ResponseType::Complete
    }
}
