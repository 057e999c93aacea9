use crate::types::{FlowId, GraphId, NodeId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use crate::CoreError;

/// Domain event trait for all events in the system
pub trait DomainEvent: Debug + Send + Sync {
    /// Returns the type of the event as a string
    fn event_type(&self) -> &'static str;

    /// Returns the flow session this event belongs to
    fn flow_id(&self) -> &FlowId;

    /// Returns the timestamp when the event occurred
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Handler for domain events
#[async_trait]
pub trait DomainEventHandler: Send + Sync {
    /// Handle a domain event
    async fn handle_event(&self, event: Box<dyn DomainEvent>) -> Result<(), CoreError>;
}

/// Event handler that writes every event to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventHandler;

#[async_trait]
impl DomainEventHandler for TracingEventHandler {
    async fn handle_event(&self, event: Box<dyn DomainEvent>) -> Result<(), CoreError> {
        tracing::info!(
            event_type = event.event_type(),
            flow_id = %event.flow_id(),
            timestamp = %event.timestamp(),
            event = ?event,
            "Flow event"
        );
        Ok(())
    }
}

macro_rules! domain_event {
    ($name:ident, $event_type:literal) => {
        impl DomainEvent for $name {
            fn event_type(&self) -> &'static str {
                $event_type
            }

            fn flow_id(&self) -> &FlowId {
                &self.flow_id
            }

            fn timestamp(&self) -> DateTime<Utc> {
                self.timestamp
            }
        }
    };
}

/// Event: flow session created
#[derive(Debug)]
pub struct FlowStarted {
    /// The flow session
    pub flow_id: FlowId,

    /// The graph the session runs
    pub graph_id: GraphId,

    /// The timestamp when the session was created
    pub timestamp: DateTime<Utc>,
}

domain_event!(FlowStarted, "flow.started");

/// Event: session moved between nodes
#[derive(Debug)]
pub struct FlowAdvanced {
    /// The flow session
    pub flow_id: FlowId,
    /// Node left behind
    pub from: NodeId,
    /// Node entered
    pub to: NodeId,
    /// The timestamp when the event occurred
    pub timestamp: DateTime<Utc>,
}

domain_event!(FlowAdvanced, "flow.advanced");

/// Event: recoverable failure on a node
#[derive(Debug)]
pub struct StepRetried {
    /// The flow session
    pub flow_id: FlowId,
    /// Node that failed
    pub node_id: NodeId,
    /// Attempt number, starting at one
    pub attempt: u32,
    /// Executor-supplied reason
    pub reason: String,
    /// The timestamp when the event occurred
    pub timestamp: DateTime<Utc>,
}

domain_event!(StepRetried, "flow.step_retried");

/// Event: journey completed
#[derive(Debug)]
pub struct FlowCompleted {
    /// The flow session
    pub flow_id: FlowId,
    /// Authenticated user, if any
    pub user_id: Option<String>,
    /// The timestamp when the event occurred
    pub timestamp: DateTime<Utc>,
}

domain_event!(FlowCompleted, "flow.completed");

/// Event: journey failed
#[derive(Debug)]
pub struct FlowFailed {
    /// The flow session
    pub flow_id: FlowId,
    /// Node where the journey stopped
    pub node_id: NodeId,
    /// Stable error code
    pub code: String,
    /// Server-side reason
    pub reason: String,
    /// The timestamp when the event occurred
    pub timestamp: DateTime<Utc>,
}

domain_event!(FlowFailed, "flow.failed");
