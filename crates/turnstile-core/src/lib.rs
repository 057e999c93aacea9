//!
//! Turnstile Core - flow orchestration engine for the Turnstile identity platform
//!
//! This crate defines the graph model, flow sessions, the executor interface
//! and the orchestrator that drives a session through a graph one caller
//! round trip at a time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use std::collections::HashMap;

/// Domain layer - graph model, sessions, events and repository interfaces
pub mod domain;

/// Application services - the orchestrator and its wire types
pub mod application;

/// Executor registry
pub mod registry;

/// Core types and identifiers
pub mod types;

/// Error types
pub mod error;

// Re-export key types
pub use error::{CoreError, InputViolation};
pub use registry::ExecutorRegistry;
pub use types::{
    ApplicationId, AuthenticatedUser, FlowId, FlowType, GraphId, NodeId, RuntimeData, ValueMap,
};

// Re-export main API types for easy use
pub use application::orchestrator::{Orchestrator, OrchestratorConfig};
pub use application::responses::{
    FlowResponse, Outcome, Prompt, ResponseType, StepInput, TerminalResult,
};
pub use domain::application::Application;
pub use domain::events::{DomainEvent, DomainEventHandler, TracingEventHandler};
pub use domain::flow_session::{FlowSession, FlowStatus};
pub use domain::graph::{ExecutorBinding, Graph, InputField, InputType, Node, NodeKind};
pub use domain::repository::{ApplicationRepository, FlowSessionRepository, GraphRepository};

/// Everything an executor may read for one invocation
#[derive(Debug, Clone)]
pub struct ExecutorContext {
    /// Flow session being driven
    pub flow_id: FlowId,

    /// Node the executor is bound to
    pub node_id: NodeId,

    /// Application the journey belongs to
    pub application_id: ApplicationId,

    /// Purpose of the journey
    pub flow_type: FlowType,

    /// Identity provider named by the binding
    pub idp_name: Option<String>,

    /// Opaque binding properties
    pub properties: HashMap<String, String>,

    /// Every input collected so far, including this submission
    pub inputs: ValueMap,

    /// Attributes accumulated by earlier executors
    pub attributes: ValueMap,

    /// Executor-private state from earlier round trips
    pub runtime_data: RuntimeData,

    /// User established by an earlier node, if any
    pub authenticated_user: Option<AuthenticatedUser>,

    /// Instant after which the orchestrator abandons the call
    pub deadline: tokio::time::Instant,
}

impl ExecutorContext {
    /// String input by name
    pub fn input_str(&self, name: &str) -> Option<&str> {
        self.inputs.get(name).and_then(|value| value.as_str())
    }

    /// Binding property by name
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Runtime data entry by key
    pub fn runtime(&self, key: &str) -> Option<&str> {
        self.runtime_data.get(key).map(String::as_str)
    }

    /// Time left before the deadline
    pub fn remaining(&self) -> std::time::Duration {
        self.deadline
            .saturating_duration_since(tokio::time::Instant::now())
    }
}

/// How an executor invocation ended
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutorStatus {
    /// The step is done; the session may advance
    Complete,
    /// More caller input is needed before the step can finish
    UserInputRequired(Vec<InputField>),
    /// Recoverable failure, such as a wrong password
    Retry(String),
    /// Non-recoverable failure; the journey ends
    Failure(String),
}

/// Result of executor invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    /// How the invocation ended
    pub status: ExecutorStatus,

    /// Names the successor among the node's `next` candidates
    pub outcome: Option<String>,

    /// Attributes merged into the session on completion
    pub attributes: ValueMap,

    /// Identity established by the step
    pub authenticated_user: Option<AuthenticatedUser>,

    /// Runtime data changes; `None` removes the key. Applied regardless of status.
    pub runtime_data: HashMap<String, Option<String>>,

    /// Caller-facing data such as a redirect URL
    pub additional_data: HashMap<String, String>,
}

impl ExecutionResult {
    fn with_status(status: ExecutorStatus) -> Self {
        Self {
            status,
            outcome: None,
            attributes: ValueMap::new(),
            authenticated_user: None,
            runtime_data: HashMap::new(),
            additional_data: HashMap::new(),
        }
    }

    /// Step finished
    pub fn complete() -> Self {
        Self::with_status(ExecutorStatus::Complete)
    }

    /// Step needs the given fields from the caller
    pub fn user_input_required(fields: Vec<InputField>) -> Self {
        Self::with_status(ExecutorStatus::UserInputRequired(fields))
    }

    /// Recoverable failure
    pub fn retry(reason: impl Into<String>) -> Self {
        Self::with_status(ExecutorStatus::Retry(reason.into()))
    }

    /// Non-recoverable failure
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::with_status(ExecutorStatus::Failure(reason.into()))
    }

    /// Select the successor node
    pub fn with_outcome(mut self, outcome: impl Into<String>) -> Self {
        self.outcome = Some(outcome.into());
        self
    }

    /// Add a session attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Set the authenticated user
    pub fn with_user(mut self, user: AuthenticatedUser) -> Self {
        self.authenticated_user = Some(user);
        self
    }

    /// Store executor-private state
    pub fn with_runtime_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.runtime_data.insert(key.into(), Some(value.into()));
        self
    }

    /// Drop executor-private state
    pub fn clear_runtime_data(mut self, key: impl Into<String>) -> Self {
        self.runtime_data.insert(key.into(), None);
        self
    }

    /// Add caller-facing data
    pub fn with_additional_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_data.insert(key.into(), value.into());
        self
    }
}

/// Non-async base trait for executors
/// This trait is object-safe and used as a marker trait
pub trait ExecutorBase: Send + Sync {
    /// Registry name of the executor
    fn name(&self) -> &str;
}

/// A unit of business logic bound to task nodes
#[async_trait]
pub trait Executor: ExecutorBase {
    /// Run the step. An `Err` is treated as a non-recoverable internal failure.
    async fn execute(&self, ctx: &ExecutorContext) -> Result<ExecutionResult, CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    struct GreetingExecutor;

    impl ExecutorBase for GreetingExecutor {
        fn name(&self) -> &str {
            "GreetingExecutor"
        }
    }

    #[async_trait]
    impl Executor for GreetingExecutor {
        async fn execute(&self, ctx: &ExecutorContext) -> Result<ExecutionResult, CoreError> {
            match ctx.input_str("name") {
                Some(name) => Ok(ExecutionResult::complete()
                    .with_attribute("greeting", json!(format!("Hello, {}!", name)))),
                None => Ok(ExecutionResult::user_input_required(vec![InputField::new(
                    "name",
                    InputType::String,
                    true,
                )])),
            }
        }
    }

    fn context(inputs: ValueMap) -> ExecutorContext {
        ExecutorContext {
            flow_id: FlowId::from("flow-1"),
            node_id: NodeId::from("greet"),
            application_id: ApplicationId::from("app-1"),
            flow_type: FlowType::Authentication,
            idp_name: None,
            properties: HashMap::from([("tone".to_string(), "warm".to_string())]),
            inputs,
            attributes: ValueMap::new(),
            runtime_data: RuntimeData::from([("attempt".to_string(), "1".to_string())]),
            authenticated_user: None,
            deadline: tokio::time::Instant::now() + Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_executor_completes_with_input() {
        let ctx = context(ValueMap::from([("name".to_string(), json!("Ada"))]));
        let result = GreetingExecutor.execute(&ctx).await.unwrap();
        assert_eq!(result.status, ExecutorStatus::Complete);
        assert_eq!(result.attributes["greeting"], json!("Hello, Ada!"));
    }

    #[tokio::test]
    async fn test_executor_asks_for_missing_input() {
        let result = GreetingExecutor.execute(&context(ValueMap::new())).await.unwrap();
        match result.status {
            ExecutorStatus::UserInputRequired(fields) => assert_eq!(fields[0].name, "name"),
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[test]
    fn test_context_accessors() {
        let ctx = context(ValueMap::from([("count".to_string(), json!(3))]));
        assert_eq!(ctx.property("tone"), Some("warm"));
        assert_eq!(ctx.runtime("attempt"), Some("1"));
        assert_eq!(ctx.input_str("count"), None);
        assert!(ctx.remaining() <= Duration::from_secs(5));
    }

    #[test]
    fn test_result_builders() {
        let result = ExecutionResult::retry("wrong code")
            .with_runtime_data("otp.digest", "abc")
            .clear_runtime_data("otp.expiry")
            .with_additional_data("redirectUrl", "https://idp.example/authorize");
        assert_eq!(result.status, ExecutorStatus::Retry("wrong code".to_string()));
        assert_eq!(result.runtime_data["otp.digest"].as_deref(), Some("abc"));
        assert_eq!(result.runtime_data["otp.expiry"], None);
        assert_eq!(result.additional_data.len(), 1);
    }
}
