use crate::{
    application::responses::{is_present, FlowResponse, Prompt, StepInput},
    domain::events::DomainEventHandler,
    domain::flow_session::FlowSession,
    domain::graph::{ExecutorBinding, Graph, InputField, Node, NodeKind},
    domain::repository::{ApplicationRepository, FlowSessionRepository, GraphRepository},
    registry::ExecutorRegistry,
    types::{ApplicationId, FlowId, FlowType, NodeId, ValueMap},
    CoreError, ExecutionResult, ExecutorContext, ExecutorStatus, InputViolation,
};
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Tunables for the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// How long a session lives after creation
    pub session_ttl: Duration,

    /// Recoverable failures allowed per node before the journey fails
    pub max_retries: u32,

    /// Deadline for a single executor call
    pub step_timeout: Duration,

    /// Keep completed and failed sessions until they expire
    pub retain_terminal_sessions: bool,

    /// Upper bound on nodes entered within one call
    pub max_chain_length: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(15 * 60),
            max_retries: 3,
            step_timeout: Duration::from_secs(10),
            retain_terminal_sessions: false,
            max_chain_length: 32,
        }
    }
}

/// Where a unit of work left the session
#[derive(Debug)]
enum Step {
    /// The session sits on a node it has not yet processed
    Entered,
    /// The caller must act
    Prompt(Prompt),
    /// The session reached a terminal state
    Ended,
}

/// Drives flow sessions through their graphs
pub struct Orchestrator {
    /// Repository for flow sessions
    sessions: Arc<dyn FlowSessionRepository>,

    /// Repository for graphs
    graphs: Arc<dyn GraphRepository>,

    /// Repository for applications
    applications: Arc<dyn ApplicationRepository>,

    /// Executors by name
    executors: Arc<ExecutorRegistry>,

    /// Event handler
    event_handler: Arc<dyn DomainEventHandler>,

    /// Flow IDs with a submission currently being processed
    in_flight: Arc<DashMap<FlowId, ()>>,

    config: OrchestratorConfig,
}

/// Releases an in-flight claim when dropped
struct InFlightGuard {
    in_flight: Arc<DashMap<FlowId, ()>>,
    flow_id: FlowId,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.flow_id);
    }
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(
        sessions: Arc<dyn FlowSessionRepository>,
        graphs: Arc<dyn GraphRepository>,
        applications: Arc<dyn ApplicationRepository>,
        executors: Arc<ExecutorRegistry>,
        event_handler: Arc<dyn DomainEventHandler>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            sessions,
            graphs,
            applications,
            executors,
            event_handler,
            in_flight: Arc::new(DashMap::new()),
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Start a journey for an application
    pub async fn start_flow(
        &self,
        application_id: &ApplicationId,
        flow_type: FlowType,
    ) -> Result<FlowResponse, CoreError> {
        let application = self
            .applications
            .find_by_id(application_id)
            .await?
            .ok_or_else(|| CoreError::ApplicationNotFound(application_id.to_string()))?;

        let graph_id = application.graph_for(flow_type)?;
        let graph = self.graphs.load(graph_id).await?;

        if graph.flow_type != flow_type {
            return Err(CoreError::ConfigurationError(format!(
                "graph '{}' is a {} graph but is bound for {}",
                graph.id, graph.flow_type, flow_type
            )));
        }

        let start = graph
            .start_node()
            .ok_or_else(|| CoreError::GraphInvalid(format!("graph '{}' has no nodes", graph.id)))?;

        let ttl = chrono::Duration::from_std(self.config.session_ttl)
            .map_err(|e| CoreError::ConfigurationError(format!("invalid session ttl: {}", e)))?;

        let mut session = FlowSession::new(
            graph.id.clone(),
            application_id.clone(),
            flow_type,
            start.id.clone(),
            ttl,
        );

        info!(
            flow_id = %session.flow_id,
            application_id = %application_id,
            graph_id = %graph.id,
            flow_type = %flow_type,
            "Starting flow"
        );

        let response = self.drive(&graph, &mut session, Step::Entered).await?;
        self.persist(&mut session).await?;
        Ok(response)
    }

    /// Apply one caller submission to a session
    pub async fn submit_step(
        &self,
        flow_id: &FlowId,
        input: StepInput,
    ) -> Result<FlowResponse, CoreError> {
        let _guard = self.claim(flow_id)?;

        let mut session = self.load_active(flow_id).await?;
        let graph = self.graphs.load(&session.graph_id).await?;
        let node = current_node(&graph, &session)?;

        debug!(
            flow_id = %flow_id,
            node_id = %node.id,
            node_type = node.kind.as_str(),
            "Processing step submission"
        );

        let step = match &node.kind {
            NodeKind::Decision => {
                let target = select_branch(node, input.action.as_deref())?;
                session.advance_to(target)?;
                Step::Entered
            }
            NodeKind::PromptOnly => {
                check_inputs(&node.inputs, &input.inputs, &session.collected_inputs)?;
                merge_submitted(&mut session, &input.inputs);
                let target = node.next.first().cloned().ok_or_else(|| {
                    CoreError::GraphInvalid(format!("prompt node '{}' has no next node", node.id))
                })?;
                session.advance_to(target)?;
                Step::Entered
            }
            NodeKind::TaskExecution(binding) => {
                let expected = expected_inputs(node, &session);
                check_inputs(&expected, &input.inputs, &session.collected_inputs)?;
                merge_submitted(&mut session, &input.inputs);
                self.run_task(node, binding, &mut session).await?
            }
            NodeKind::AuthenticationSuccess | NodeKind::AuthenticationFailure => {
                return Err(CoreError::InvalidSessionState(format!(
                    "flow {} is parked on terminal node '{}'",
                    flow_id, node.id
                )));
            }
        };

        let response = self.drive(&graph, &mut session, step).await?;
        self.persist(&mut session).await?;
        Ok(response)
    }

    /// Read-only snapshot of a session
    pub async fn get_session(&self, flow_id: &FlowId) -> Result<FlowSession, CoreError> {
        self.sessions
            .find_by_id(flow_id)
            .await?
            .ok_or_else(|| CoreError::SessionNotFound(flow_id.to_string()))
    }

    /// Prompt for the node an active session is waiting on
    pub async fn current_prompt(&self, flow_id: &FlowId) -> Result<Prompt, CoreError> {
        let session = self.load_active(flow_id).await?;
        let graph = self.graphs.load(&session.graph_id).await?;
        let node = current_node(&graph, &session)?;
        Ok(prompt_for(node, &session))
    }

    /// Delete expired sessions, returning how many were removed
    pub async fn sweep_expired(&self) -> Result<usize, CoreError> {
        let removed = self.sessions.delete_expired(Utc::now()).await?;
        if removed > 0 {
            info!(removed, "Swept expired flow sessions");
        }
        Ok(removed)
    }

    fn claim(&self, flow_id: &FlowId) -> Result<InFlightGuard, CoreError> {
        match self.in_flight.entry(flow_id.clone()) {
            Entry::Occupied(_) => {
                warn!(flow_id = %flow_id, "Rejected concurrent submission");
                Err(CoreError::Conflict(format!(
                    "flow {} is already processing a submission",
                    flow_id
                )))
            }
            Entry::Vacant(entry) => {
                entry.insert(());
                Ok(InFlightGuard {
                    in_flight: self.in_flight.clone(),
                    flow_id: flow_id.clone(),
                })
            }
        }
    }

    async fn load_active(&self, flow_id: &FlowId) -> Result<FlowSession, CoreError> {
        let session = self.get_session(flow_id).await?;

        if session.is_expired_at(Utc::now()) {
            debug!(flow_id = %flow_id, "Discarding expired flow session");
            self.sessions.delete(flow_id).await?;
            return Err(CoreError::SessionExpired(flow_id.to_string()));
        }

        if !session.is_active() {
            return Err(CoreError::InvalidSessionState(format!(
                "flow {} is {:?}",
                flow_id, session.status
            )));
        }

        Ok(session)
    }

    /// Follow the session through nodes that need nothing from the caller
    async fn drive(
        &self,
        graph: &Graph,
        session: &mut FlowSession,
        mut step: Step,
    ) -> Result<FlowResponse, CoreError> {
        let mut entered = 0usize;

        loop {
            match step {
                Step::Prompt(prompt) => return Ok(FlowResponse::prompt(session, prompt)),
                Step::Ended => return Ok(FlowResponse::terminal(session, None)),
                Step::Entered => {
                    entered += 1;
                    if entered > self.config.max_chain_length {
                        error!(
                            flow_id = %session.flow_id,
                            node_id = %session.current_node_id,
                            "Flow exceeded the chaining limit"
                        );
                        let err = CoreError::ExecutorContractViolation(
                            "chaining limit exceeded".to_string(),
                        );
                        session.fail(err.error_code(), err.to_string())?;
                        step = Step::Ended;
                        continue;
                    }

                    let node = current_node(graph, session)?;
                    step = match &node.kind {
                        NodeKind::AuthenticationSuccess => self.finish_success(session)?,
                        NodeKind::AuthenticationFailure => {
                            let err = CoreError::ExecutionDenied(format!(
                                "reached failure node '{}'",
                                node.id
                            ));
                            session.fail(err.error_code(), err.to_string())?;
                            Step::Ended
                        }
                        NodeKind::Decision | NodeKind::PromptOnly => {
                            Step::Prompt(prompt_for(node, session))
                        }
                        NodeKind::TaskExecution(binding) => {
                            let ready = node
                                .required_inputs()
                                .all(|field| is_present(session.collected_inputs.get(&field.name)));
                            if ready {
                                self.run_task(node, binding, session).await?
                            } else {
                                Step::Prompt(prompt_for(node, session))
                            }
                        }
                    };
                }
            }
        }
    }

    fn finish_success(&self, session: &mut FlowSession) -> Result<Step, CoreError> {
        if session.authenticated_user.is_none() {
            error!(
                flow_id = %session.flow_id,
                node_id = %session.current_node_id,
                "Reached success node without an authenticated user"
            );
            let err = CoreError::ExecutorContractViolation(
                "success node reached without an authenticated user".to_string(),
            );
            session.fail(err.error_code(), err.to_string())?;
        } else {
            session.complete()?;
            info!(flow_id = %session.flow_id, "Flow completed");
        }
        Ok(Step::Ended)
    }

    async fn run_task(
        &self,
        node: &Node,
        binding: &ExecutorBinding,
        session: &mut FlowSession,
    ) -> Result<Step, CoreError> {
        let executor = match self.executors.resolve(&binding.name) {
            Ok(executor) => executor,
            Err(err) => {
                error!(
                    flow_id = %session.flow_id,
                    node_id = %node.id,
                    executor = %binding.name,
                    error = %err,
                    "Executor is not registered"
                );
                session.fail(err.error_code(), err.to_string())?;
                return Ok(Step::Ended);
            }
        };

        let ctx = ExecutorContext {
            flow_id: session.flow_id.clone(),
            node_id: node.id.clone(),
            application_id: session.application_id.clone(),
            flow_type: session.flow_type,
            idp_name: binding.idp_name.clone(),
            properties: binding.properties.clone(),
            inputs: session.collected_inputs.clone(),
            attributes: session.attributes.clone(),
            runtime_data: session.runtime_data.clone(),
            authenticated_user: session.authenticated_user.clone(),
            deadline: tokio::time::Instant::now() + self.config.step_timeout,
        };

        debug!(
            flow_id = %session.flow_id,
            node_id = %node.id,
            executor = %binding.name,
            "Invoking executor"
        );

        let result = match tokio::time::timeout(self.config.step_timeout, executor.execute(&ctx)).await
        {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                error!(
                    flow_id = %session.flow_id,
                    node_id = %node.id,
                    executor = %binding.name,
                    error = %err,
                    "Executor raised an error"
                );
                let err = CoreError::ExecutorFailure(err.to_string());
                session.fail(err.error_code(), err.to_string())?;
                return Ok(Step::Ended);
            }
            Err(_) => {
                warn!(
                    flow_id = %session.flow_id,
                    node_id = %node.id,
                    executor = %binding.name,
                    timeout_ms = self.config.step_timeout.as_millis() as u64,
                    "Executor timed out"
                );
                return self.record_retry(node, session, "The request timed out, please try again");
            }
        };

        self.apply_result(node, session, result)
    }

    fn apply_result(
        &self,
        node: &Node,
        session: &mut FlowSession,
        result: ExecutionResult,
    ) -> Result<Step, CoreError> {
        let ExecutionResult {
            status,
            outcome,
            attributes,
            authenticated_user,
            runtime_data,
            additional_data,
        } = result;

        for (key, value) in runtime_data {
            match value {
                Some(value) => session.runtime_data.insert(key, value),
                None => session.runtime_data.remove(&key),
            };
        }

        match status {
            ExecutorStatus::UserInputRequired(fields) => {
                debug!(
                    flow_id = %session.flow_id,
                    node_id = %node.id,
                    fields = fields.len(),
                    "Executor requested more input"
                );
                let mut prompt = Prompt::for_node(node);
                prompt.inputs = fields.clone();
                prompt.additional_data = additional_data;
                session.pending_inputs = fields;
                session.update_timestamp();
                Ok(Step::Prompt(prompt))
            }
            ExecutorStatus::Retry(reason) => {
                let step = self.record_retry(node, session, &reason)?;
                Ok(match step {
                    Step::Prompt(mut prompt) => {
                        prompt.additional_data = additional_data;
                        Step::Prompt(prompt)
                    }
                    other => other,
                })
            }
            ExecutorStatus::Failure(reason) => {
                info!(
                    flow_id = %session.flow_id,
                    node_id = %node.id,
                    reason = %reason,
                    "Executor denied the flow"
                );
                let err = CoreError::ExecutionDenied(reason);
                session.fail(err.error_code(), err.to_string())?;
                Ok(Step::Ended)
            }
            ExecutorStatus::Complete => {
                let target = match select_outcome(node, outcome.as_deref()) {
                    Ok(target) => target,
                    Err(err) => {
                        error!(
                            flow_id = %session.flow_id,
                            node_id = %node.id,
                            error = %err,
                            "Executor outcome does not match the graph"
                        );
                        session.fail(err.error_code(), err.to_string())?;
                        return Ok(Step::Ended);
                    }
                };

                session.attributes.extend(attributes);
                if let Some(user) = authenticated_user {
                    session.authenticated_user = Some(user);
                }
                session.advance_to(target)?;
                Ok(Step::Entered)
            }
        }
    }

    fn record_retry(
        &self,
        node: &Node,
        session: &mut FlowSession,
        reason: &str,
    ) -> Result<Step, CoreError> {
        let attempts = session.record_retry(reason)?;

        if attempts > self.config.max_retries {
            warn!(
                flow_id = %session.flow_id,
                node_id = %node.id,
                attempts,
                "Retry limit exceeded"
            );
            let err = CoreError::RetryLimitExceeded(format!(
                "{} failed attempts on node '{}'",
                attempts, node.id
            ));
            session.fail(err.error_code(), err.to_string())?;
            return Ok(Step::Ended);
        }

        debug!(
            flow_id = %session.flow_id,
            node_id = %node.id,
            attempts,
            "Recoverable step failure"
        );

        let mut prompt = Prompt::for_node(node);
        if !session.pending_inputs.is_empty() {
            prompt.inputs = session.pending_inputs.clone();
        }
        prompt.failure_reason = Some(reason.to_string());
        Ok(Step::Prompt(prompt))
    }

    async fn persist(&self, session: &mut FlowSession) -> Result<(), CoreError> {
        if session.is_active() || self.config.retain_terminal_sessions {
            session.version = self.sessions.save(session).await?;
        } else {
            self.sessions.delete(&session.flow_id).await?;
        }

        for event in session.take_events() {
            if let Err(err) = self.event_handler.handle_event(event).await {
                warn!(flow_id = %session.flow_id, error = %err, "Failed to publish flow event");
            }
        }

        Ok(())
    }
}

impl Clone for Orchestrator {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            graphs: self.graphs.clone(),
            applications: self.applications.clone(),
            executors: self.executors.clone(),
            event_handler: self.event_handler.clone(),
            in_flight: self.in_flight.clone(),
            config: self.config.clone(),
        }
    }
}

fn current_node<'g>(graph: &'g Graph, session: &FlowSession) -> Result<&'g Node, CoreError> {
    graph.node(&session.current_node_id).ok_or_else(|| {
        CoreError::GraphInvalid(format!(
            "graph '{}' has no node '{}'",
            graph.id, session.current_node_id
        ))
    })
}

fn prompt_for(node: &Node, session: &FlowSession) -> Prompt {
    match node.kind {
        NodeKind::TaskExecution(_) if !session.pending_inputs.is_empty() => {
            let mut prompt = Prompt::for_node(node);
            prompt.inputs = session.pending_inputs.clone();
            prompt
        }
        NodeKind::TaskExecution(_) => Prompt::for_node(node).outstanding(&session.collected_inputs),
        _ => Prompt::for_node(node),
    }
}

/// Declared inputs of a node, overridden by whatever its executor last asked for
fn expected_inputs(node: &Node, session: &FlowSession) -> Vec<InputField> {
    let mut fields: Vec<InputField> = node
        .inputs
        .iter()
        .filter(|field| !session.pending_inputs.iter().any(|p| p.name == field.name))
        .cloned()
        .collect();
    fields.extend(session.pending_inputs.iter().cloned());
    fields
}

fn select_branch(node: &Node, action: Option<&str>) -> Result<NodeId, CoreError> {
    node.next
        .iter()
        .find(|id| Some(id.as_str()) == action)
        .cloned()
        .ok_or_else(|| CoreError::InvalidSelection {
            selected: action.map(str::to_string),
            options: node.next.iter().map(|id| id.0.clone()).collect(),
        })
}

fn select_outcome(node: &Node, outcome: Option<&str>) -> Result<NodeId, CoreError> {
    match (node.next.as_slice(), outcome) {
        ([only], None) => Ok(only.clone()),
        (candidates, Some(outcome)) => candidates
            .iter()
            .find(|id| id.as_str() == outcome)
            .cloned()
            .ok_or_else(|| {
                CoreError::ExecutorContractViolation(format!(
                    "outcome '{}' is not a successor of node '{}'",
                    outcome, node.id
                ))
            }),
        (_, None) => Err(CoreError::ExecutorContractViolation(format!(
            "node '{}' has {} successors but the executor chose none",
            node.id,
            node.next.len()
        ))),
    }
}

/// Check a submission against the expected fields, reporting every violation
fn check_inputs(
    fields: &[InputField],
    submitted: &ValueMap,
    collected: &ValueMap,
) -> Result<(), CoreError> {
    let mut violations = Vec::new();

    for field in fields {
        match submitted.get(&field.name) {
            Some(value) if !value.is_null() => {
                if !field.input_type.matches(value) {
                    violations.push(InputViolation::new(
                        &field.name,
                        format!("expected a {}", field.input_type.as_str()),
                    ));
                } else if field.required && !is_present(Some(value)) {
                    violations.push(InputViolation::new(&field.name, "must not be empty"));
                }
            }
            _ => {
                if field.required && !is_present(collected.get(&field.name)) {
                    violations.push(InputViolation::new(&field.name, "is required"));
                }
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(CoreError::InputValidation(violations))
    }
}

fn merge_submitted(session: &mut FlowSession, submitted: &ValueMap) {
    let present: ValueMap = submitted
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();
    session.merge_inputs(&present);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::flow_session::FlowSession;
    use crate::domain::graph::InputType;
    use serde_json::json;

    fn otp_node() -> Node {
        Node::new("otp", NodeKind::PromptOnly)
            .with_inputs(vec![
                InputField::new("mobileNumber", InputType::String, true),
                InputField::new("remember", InputType::Boolean, false),
            ])
            .with_next(&["send"])
    }

    #[test]
    fn test_check_inputs_batches_violations() {
        let submitted = ValueMap::from([("remember".to_string(), json!("yes"))]);
        let err = check_inputs(&otp_node().inputs, &submitted, &ValueMap::new()).unwrap_err();
        match err {
            CoreError::InputValidation(violations) => {
                assert_eq!(violations.len(), 2);
                assert_eq!(violations[0].field, "mobileNumber");
                assert_eq!(violations[1].field, "remember");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_check_inputs_accepts_previously_collected() {
        let collected = ValueMap::from([("mobileNumber".to_string(), json!("+15550100"))]);
        assert!(check_inputs(&otp_node().inputs, &ValueMap::new(), &collected).is_ok());
    }

    #[test]
    fn test_check_inputs_rejects_empty_required_string() {
        let submitted = ValueMap::from([("mobileNumber".to_string(), json!(""))]);
        assert!(check_inputs(&otp_node().inputs, &submitted, &ValueMap::new()).is_err());
    }

    #[test]
    fn test_pending_inputs_override_declared_fields() {
        let node = Node::new("verify", NodeKind::TaskExecution(ExecutorBinding::named("SmsOtpExecutor")))
            .with_inputs(vec![
                InputField::new("mobileNumber", InputType::String, true),
                InputField::new("otp", InputType::String, false),
            ])
            .with_next(&["done"]);
        let mut session = FlowSession::new(
            "login".into(),
            "app-1".into(),
            crate::FlowType::Authentication,
            node.id.clone(),
            chrono::Duration::minutes(5),
        );
        session
            .collected_inputs
            .insert("mobileNumber".to_string(), json!("+15550001111"));

        // Nothing requested yet: only what is still missing is prompted
        assert!(prompt_for(&node, &session).inputs.iter().all(|f| f.name != "mobileNumber"));

        session.pending_inputs = vec![InputField::new("otp", InputType::String, true)];
        let prompt = prompt_for(&node, &session);
        assert_eq!(prompt.inputs.len(), 1);
        assert_eq!(prompt.inputs[0].name, "otp");

        let expected = expected_inputs(&node, &session);
        assert_eq!(expected.len(), 2);
        assert!(expected.iter().any(|f| f.name == "otp" && f.required));

        let submitted = ValueMap::from([("otp".to_string(), json!(123456))]);
        match check_inputs(&expected, &submitted, &session.collected_inputs).unwrap_err() {
            CoreError::InputValidation(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].field, "otp");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_select_branch() {
        let node = Node::new("choose", NodeKind::Decision).with_next(&["password", "sms"]);
        assert_eq!(select_branch(&node, Some("sms")).unwrap().as_str(), "sms");

        match select_branch(&node, Some("email")).unwrap_err() {
            CoreError::InvalidSelection { selected, options } => {
                assert_eq!(selected.as_deref(), Some("email"));
                assert_eq!(options, vec!["password", "sms"]);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(select_branch(&node, None).is_err());
    }

    #[test]
    fn test_select_outcome() {
        let single = Node::new("auth", NodeKind::TaskExecution(ExecutorBinding::named("X")))
            .with_next(&["done"]);
        assert_eq!(select_outcome(&single, None).unwrap().as_str(), "done");
        assert!(select_outcome(&single, Some("elsewhere")).is_err());

        let multi = Node::new("auth", NodeKind::TaskExecution(ExecutorBinding::named("X")))
            .with_next(&["provision", "done"]);
        assert_eq!(select_outcome(&multi, Some("done")).unwrap().as_str(), "done");
        assert!(matches!(
            select_outcome(&multi, None),
            Err(CoreError::ExecutorContractViolation(_))
        ));
    }

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_retries, 3);
        assert!(!config.retain_terminal_sessions);
        assert_eq!(config.session_ttl, Duration::from_secs(900));
    }
}
