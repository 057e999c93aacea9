use crate::{
    domain::events::{
        DomainEvent, FlowAdvanced, FlowCompleted, FlowFailed, FlowStarted, StepRetried,
    },
    domain::graph::InputField,
    types::{ApplicationId, AuthenticatedUser, FlowId, FlowType, GraphId, NodeId, RuntimeData, ValueMap},
    CoreError,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flow session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowStatus {
    /// Journey is waiting on the caller
    InProgress,

    /// Journey reached the success terminal
    Completed,

    /// Journey was rejected or gave up
    Failed,
}

/// Aggregate: one user's journey through a graph
#[derive(Debug, Serialize, Deserialize)]
pub struct FlowSession {
    /// Unique identifier
    pub flow_id: FlowId,

    /// Graph the session runs
    pub graph_id: GraphId,

    /// Application the journey belongs to
    pub application_id: ApplicationId,

    /// Purpose of the journey
    pub flow_type: FlowType,

    /// Node awaiting the next submission
    pub current_node_id: NodeId,

    /// Inputs the caller has supplied so far
    pub collected_inputs: ValueMap,

    /// Attributes contributed by executors
    pub attributes: ValueMap,

    /// Executor-private state
    pub runtime_data: RuntimeData,

    /// Fields the current node's executor last asked for
    #[serde(default)]
    pub pending_inputs: Vec<InputField>,

    /// User established by an executor, if any
    pub authenticated_user: Option<AuthenticatedUser>,

    /// Consecutive recoverable failures on the current node
    pub retry_count: u32,

    /// Current status
    pub status: FlowStatus,

    /// Error code recorded when the session failed
    pub failure_code: Option<String>,

    /// Optimistic concurrency version, bumped by every save
    pub version: u64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// After this instant the session accepts no submissions
    pub expires_at: DateTime<Utc>,

    /// Domain events not yet published
    #[serde(skip)]
    events: Vec<Box<dyn DomainEvent>>,
}

impl Clone for FlowSession {
    fn clone(&self) -> Self {
        Self {
            flow_id: self.flow_id.clone(),
            graph_id: self.graph_id.clone(),
            application_id: self.application_id.clone(),
            flow_type: self.flow_type,
            current_node_id: self.current_node_id.clone(),
            collected_inputs: self.collected_inputs.clone(),
            attributes: self.attributes.clone(),
            runtime_data: self.runtime_data.clone(),
            pending_inputs: self.pending_inputs.clone(),
            authenticated_user: self.authenticated_user.clone(),
            retry_count: self.retry_count,
            status: self.status,
            failure_code: self.failure_code.clone(),
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
            expires_at: self.expires_at,
            // Pending events belong to the original
            events: Vec::new(),
        }
    }
}

impl FlowSession {
    /// Create a session positioned at `start_node`
    pub fn new(
        graph_id: GraphId,
        application_id: ApplicationId,
        flow_type: FlowType,
        start_node: NodeId,
        ttl: Duration,
    ) -> Self {
        let flow_id = FlowId(Uuid::new_v4().to_string());
        let now = Utc::now();

        let mut session = Self {
            flow_id: flow_id.clone(),
            graph_id: graph_id.clone(),
            application_id,
            flow_type,
            current_node_id: start_node,
            collected_inputs: ValueMap::new(),
            attributes: ValueMap::new(),
            runtime_data: RuntimeData::new(),
            pending_inputs: Vec::new(),
            authenticated_user: None,
            retry_count: 0,
            status: FlowStatus::InProgress,
            failure_code: None,
            version: 0,
            created_at: now,
            updated_at: now,
            expires_at: now + ttl,
            events: Vec::with_capacity(4),
        };

        session.record_event(Box::new(FlowStarted {
            flow_id,
            graph_id,
            timestamp: now,
        }));

        session
    }

    /// Update the timestamp
    #[inline]
    pub fn update_timestamp(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Whether the session is past its expiry at `now`
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the session still accepts submissions
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == FlowStatus::InProgress
    }

    /// Merge caller inputs into the collected set
    pub fn merge_inputs(&mut self, inputs: &ValueMap) {
        for (name, value) in inputs {
            self.collected_inputs.insert(name.clone(), value.clone());
        }
    }

    /// Move to another node, clearing the retry counter and pending inputs
    pub fn advance_to(&mut self, node_id: NodeId) -> Result<(), CoreError> {
        self.ensure_active("advance")?;

        let from = std::mem::replace(&mut self.current_node_id, node_id.clone());
        self.retry_count = 0;
        self.pending_inputs.clear();

        self.record_event(Box::new(FlowAdvanced {
            flow_id: self.flow_id.clone(),
            from,
            to: node_id,
            timestamp: Utc::now(),
        }));

        self.update_timestamp();
        Ok(())
    }

    /// Count a recoverable failure on the current node and return the new count
    pub fn record_retry(&mut self, reason: &str) -> Result<u32, CoreError> {
        self.ensure_active("retry")?;

        self.retry_count += 1;

        self.record_event(Box::new(StepRetried {
            flow_id: self.flow_id.clone(),
            node_id: self.current_node_id.clone(),
            attempt: self.retry_count,
            reason: reason.to_string(),
            timestamp: Utc::now(),
        }));

        self.update_timestamp();
        Ok(self.retry_count)
    }

    /// Complete the journey successfully
    pub fn complete(&mut self) -> Result<(), CoreError> {
        self.ensure_active("complete")?;

        self.status = FlowStatus::Completed;

        self.record_event(Box::new(FlowCompleted {
            flow_id: self.flow_id.clone(),
            user_id: self
                .authenticated_user
                .as_ref()
                .map(|user| user.user_id.clone()),
            timestamp: Utc::now(),
        }));

        self.update_timestamp();
        Ok(())
    }

    /// Mark the journey as failed with a stable error code
    pub fn fail(&mut self, code: &str, reason: String) -> Result<(), CoreError> {
        self.ensure_active("fail")?;

        self.status = FlowStatus::Failed;
        self.failure_code = Some(code.to_string());

        self.record_event(Box::new(FlowFailed {
            flow_id: self.flow_id.clone(),
            node_id: self.current_node_id.clone(),
            code: code.to_string(),
            reason,
            timestamp: Utc::now(),
        }));

        self.update_timestamp();
        Ok(())
    }

    fn ensure_active(&self, operation: &str) -> Result<(), CoreError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(CoreError::InvalidSessionState(format!(
                "cannot {} flow {} in state {:?}",
                operation, self.flow_id, self.status
            )))
        }
    }

    /// Record a domain event
    pub fn record_event(&mut self, event: Box<dyn DomainEvent>) {
        self.events.push(event);
    }

    /// Get and clear all domain events
    pub fn take_events(&mut self) -> Vec<Box<dyn DomainEvent>> {
        std::mem::take(&mut self.events)
    }
}
