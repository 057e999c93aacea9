//! End-to-end journey behaviour against the in-memory engine

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use turnstile_core::{
    ApplicationId, AuthenticatedUser, CoreError, ExecutionResult, Executor, ExecutorBase,
    ExecutorContext, FlowStatus, FlowType, NodeId, Orchestrator, OrchestratorConfig, Outcome,
    StepInput, ValueMap,
};
use turnstile_integration_tests::utils::{application, last_code, prompt_node, TestEngineBuilder};

const LOGIN: &str = r#"
id: login
type: AUTHENTICATION
nodes:
  - id: choose
    type: DECISION
    start: true
    next: [password, sms, google]
  - id: password
    type: TASK_EXECUTION
    inputData:
      - { name: username, type: string, required: true }
      - { name: password, type: string, required: true }
    executor:
      name: BasicAuthExecutor
    next: [done]
  - id: sms
    type: PROMPT_ONLY
    inputData:
      - { name: mobileNumber, type: string, required: true }
    next: [verify]
  - id: verify
    type: TASK_EXECUTION
    executor:
      name: SmsOtpExecutor
    next: [done]
  - id: google
    type: TASK_EXECUTION
    executor:
      name: FederatedAuthExecutor
      idpName: google
    next: [done]
  - id: done
    type: AUTHENTICATION_SUCCESS
"#;

const SIGNUP: &str = r#"
id: signup
type: REGISTRATION
nodes:
  - id: credentials
    type: TASK_EXECUTION
    start: true
    inputData:
      - { name: username, type: string, required: true }
      - { name: password, type: string, required: true }
      - { name: email, type: string, required: true }
    executor:
      name: AttributeCollectorExecutor
    next: [provision]
  - id: provision
    type: TASK_EXECUTION
    executor:
      name: ProvisioningExecutor
    next: [welcome]
  - id: welcome
    type: AUTHENTICATION_SUCCESS
"#;

const PROVISIONED_LOGIN: &str = r#"
id: provisioned-login
type: AUTHENTICATION
nodes:
  - id: credentials
    type: TASK_EXECUTION
    inputData:
      - { name: username, type: string, required: true }
      - { name: password, type: string, required: true }
      - { name: givenName, type: string, required: false }
    executor:
      name: BasicAuthExecutor
    next: [provision]
  - id: provision
    type: TASK_EXECUTION
    executor:
      name: ProvisioningExecutor
    next: [done]
  - id: done
    type: AUTHENTICATION_SUCCESS
"#;

const SLOW_SIGNUP: &str = r#"
id: slow-signup
type: REGISTRATION
nodes:
  - id: credentials
    type: TASK_EXECUTION
    start: true
    inputData:
      - { name: username, type: string, required: true }
    executor:
      name: AttributeCollectorExecutor
    next: [provision]
  - id: provision
    type: TASK_EXECUTION
    executor:
      name: CountingProvisioner
    next: [welcome]
  - id: welcome
    type: AUTHENTICATION_SUCCESS
"#;

/// Provisioner that takes a while and counts its invocations
struct CountingProvisioner {
    calls: Arc<AtomicUsize>,
}

impl ExecutorBase for CountingProvisioner {
    fn name(&self) -> &str {
        "CountingProvisioner"
    }
}

#[async_trait]
impl Executor for CountingProvisioner {
    async fn execute(&self, ctx: &ExecutorContext) -> Result<ExecutionResult, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(ExecutionResult::complete().with_user(AuthenticatedUser {
            user_id: format!("user-{}", ctx.flow_id),
            username: ctx.input_str("username").map(str::to_string),
            attributes: ValueMap::new(),
        }))
    }
}

async fn engine(config: OrchestratorConfig) -> (Orchestrator, turnstile_state_inmemory::RecordingNotificationSender, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = TestEngineBuilder::new()
        .with_graph_yaml(LOGIN)
        .with_graph_yaml(SIGNUP)
        .with_graph_yaml(SLOW_SIGNUP)
        .with_graph_yaml(PROVISIONED_LOGIN)
        .with_application(application("portal", "login", Some("signup")))
        .with_application(application("members", "provisioned-login", None))
        .with_application(application("slow", "login", Some("slow-signup")))
        .with_user(
            "ada",
            "correct-horse",
            HashMap::from([("mobileNumber".to_string(), json!("+15550100"))]),
        )
        .with_executor(Arc::new(CountingProvisioner { calls: calls.clone() }))
        .with_config(config)
        .build()
        .await;
    (engine.orchestrator, engine.sms, calls)
}

fn inputs(pairs: &[(&str, &str)]) -> StepInput {
    StepInput::with_inputs(
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), json!(value)))
            .collect(),
    )
}

#[tokio::test]
async fn decision_start_offers_every_branch() -> Result<(), CoreError> {
    let (orchestrator, _, _) = engine(OrchestratorConfig::default()).await;

    let response = orchestrator
        .start_flow(&ApplicationId::from("portal"), FlowType::Authentication)
        .await?;

    let prompt = response.prompt.expect("decision prompt");
    assert_eq!(prompt.node_id, "choose");
    assert_eq!(prompt.actions, vec!["password", "sms", "google"]);
    assert_eq!(response.flow_status, FlowStatus::InProgress);
    Ok(())
}

#[tokio::test]
async fn missing_required_field_keeps_the_node() -> Result<(), CoreError> {
    let (orchestrator, _, _) = engine(OrchestratorConfig::default()).await;
    let flow = orchestrator
        .start_flow(&ApplicationId::from("portal"), FlowType::Authentication)
        .await?;
    orchestrator
        .submit_step(&flow.flow_id, StepInput::with_action("sms"))
        .await?;

    let err = orchestrator
        .submit_step(&flow.flow_id, StepInput::default())
        .await
        .unwrap_err();

    match err {
        CoreError::InputValidation(violations) => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].field, "mobileNumber");
        }
        other => panic!("expected InputValidation, got {:?}", other),
    }

    let session = orchestrator.get_session(&flow.flow_id).await?;
    assert_eq!(session.current_node_id, NodeId::from("sms"));
    assert_eq!(session.status, FlowStatus::InProgress);
    Ok(())
}

#[tokio::test]
async fn credentials_and_provisioning_complete_in_one_step() -> Result<(), CoreError> {
    let (orchestrator, _, _) = engine(OrchestratorConfig::default()).await;
    let flow = orchestrator
        .start_flow(&ApplicationId::from("portal"), FlowType::Registration)
        .await?;
    assert_eq!(prompt_node(&flow), "credentials");

    let response = orchestrator
        .submit_step(
            &flow.flow_id,
            inputs(&[("username", "grace"), ("password", "pw"), ("email", "grace@example.com")]),
        )
        .await?;

    assert!(response.is_complete());
    assert_eq!(response.flow_status, FlowStatus::Completed);
    let result = response.result.expect("terminal result");
    assert_eq!(result.outcome, Outcome::Success);
    let user = result.user.expect("provisioned user");
    assert_eq!(user.username.as_deref(), Some("grace"));
    assert!(!user.attributes.contains_key("password"));
    Ok(())
}

#[tokio::test]
async fn sign_in_then_provisioning_completes_in_one_step() -> Result<(), CoreError> {
    let (orchestrator, _, _) = engine(OrchestratorConfig::default()).await;
    let flow = orchestrator
        .start_flow(&ApplicationId::from("members"), FlowType::Authentication)
        .await?;
    assert_eq!(prompt_node(&flow), "credentials");

    let response = orchestrator
        .submit_step(
            &flow.flow_id,
            inputs(&[("username", "ada"), ("password", "correct-horse"), ("givenName", "Ada")]),
        )
        .await?;

    assert_eq!(response.flow_status, FlowStatus::Completed);
    let result = response.result.expect("terminal result");
    assert_eq!(result.outcome, Outcome::Success);
    let user = result.user.expect("signed-in user");
    assert_eq!(user.username.as_deref(), Some("ada"));
    // The existing account is updated, not duplicated
    assert_eq!(user.attributes["mobileNumber"], json!("+15550100"));
    assert_eq!(user.attributes["givenName"], json!("Ada"));
    assert!(!user.attributes.contains_key("password"));
    Ok(())
}

#[tokio::test]
async fn requested_fields_survive_inspection_and_are_type_checked() -> Result<(), CoreError> {
    let (orchestrator, sms, _) = engine(OrchestratorConfig::default()).await;
    let flow = orchestrator
        .start_flow(&ApplicationId::from("portal"), FlowType::Authentication)
        .await?;
    orchestrator
        .submit_step(&flow.flow_id, StepInput::with_action("sms"))
        .await?;
    orchestrator
        .submit_step(&flow.flow_id, inputs(&[("mobileNumber", "+15550100")]))
        .await?;

    let prompt = orchestrator.current_prompt(&flow.flow_id).await?;
    assert_eq!(prompt.node_id, "verify");
    let names: Vec<_> = prompt.inputs.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["otp"]);

    let numeric = StepInput::with_inputs(ValueMap::from([("otp".to_string(), json!(123456))]));
    match orchestrator.submit_step(&flow.flow_id, numeric).await.unwrap_err() {
        CoreError::InputValidation(violations) => assert_eq!(violations[0].field, "otp"),
        other => panic!("expected InputValidation, got {:?}", other),
    }
    let session = orchestrator.get_session(&flow.flow_id).await?;
    assert_eq!(session.current_node_id, NodeId::from("verify"));
    assert_eq!(session.retry_count, 0);

    let code = last_code(&sms, "+15550100").await;
    let response = orchestrator
        .submit_step(&flow.flow_id, inputs(&[("otp", code.as_str())]))
        .await?;
    assert_eq!(response.flow_status, FlowStatus::Completed);
    Ok(())
}

#[tokio::test]
async fn concurrent_submissions_apply_once() -> Result<(), CoreError> {
    let (orchestrator, _, calls) = engine(OrchestratorConfig::default()).await;
    let flow = orchestrator
        .start_flow(&ApplicationId::from("slow"), FlowType::Registration)
        .await?;

    let (first, second) = tokio::join!(
        orchestrator.submit_step(&flow.flow_id, inputs(&[("username", "grace")])),
        orchestrator.submit_step(&flow.flow_id, inputs(&[("username", "grace")])),
    );

    let results = [first, second];
    let applied = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(CoreError::Conflict(_))))
        .count();

    assert_eq!(applied, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn expired_session_rejects_submissions() -> Result<(), CoreError> {
    let (orchestrator, _, _) = engine(OrchestratorConfig {
        session_ttl: Duration::from_millis(50),
        ..OrchestratorConfig::default()
    })
    .await;
    let flow = orchestrator
        .start_flow(&ApplicationId::from("portal"), FlowType::Authentication)
        .await?;

    tokio::time::sleep(Duration::from_millis(120)).await;

    let err = orchestrator
        .submit_step(&flow.flow_id, StepInput::with_action("password"))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "FLW-2003");
    assert!(matches!(
        orchestrator.get_session(&flow.flow_id).await,
        Err(CoreError::SessionNotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn retry_bound_fails_the_flow_in_place() -> Result<(), CoreError> {
    let (orchestrator, _, _) = engine(OrchestratorConfig {
        max_retries: 2,
        retain_terminal_sessions: true,
        ..OrchestratorConfig::default()
    })
    .await;
    let flow = orchestrator
        .start_flow(&ApplicationId::from("portal"), FlowType::Authentication)
        .await?;
    orchestrator
        .submit_step(&flow.flow_id, StepInput::with_action("password"))
        .await?;

    for _ in 0..2 {
        let response = orchestrator
            .submit_step(&flow.flow_id, inputs(&[("username", "ada"), ("password", "nope")]))
            .await?;
        assert_eq!(prompt_node(&response), "password");
        assert_eq!(
            response.prompt.and_then(|p| p.failure_reason).as_deref(),
            Some("Invalid username or password")
        );
    }

    let response = orchestrator
        .submit_step(&flow.flow_id, inputs(&[("username", "ada"), ("password", "nope")]))
        .await?;
    assert_eq!(response.flow_status, FlowStatus::Failed);
    assert_eq!(
        response.result.and_then(|r| r.error_code).as_deref(),
        Some("FLW-4001")
    );

    let session = orchestrator.get_session(&flow.flow_id).await?;
    assert_eq!(session.current_node_id, NodeId::from("password"));
    assert_eq!(session.status, FlowStatus::Failed);
    Ok(())
}

#[tokio::test]
async fn sms_passcode_signs_in_a_known_number() -> Result<(), CoreError> {
    let (orchestrator, sms, _) = engine(OrchestratorConfig::default()).await;
    let flow = orchestrator
        .start_flow(&ApplicationId::from("portal"), FlowType::Authentication)
        .await?;
    orchestrator
        .submit_step(&flow.flow_id, StepInput::with_action("sms"))
        .await?;

    let response = orchestrator
        .submit_step(&flow.flow_id, inputs(&[("mobileNumber", "+15550100")]))
        .await?;
    assert_eq!(prompt_node(&response), "verify");

    let code = last_code(&sms, "+15550100").await;
    let response = orchestrator
        .submit_step(&flow.flow_id, inputs(&[("otp", code.as_str())]))
        .await?;

    assert_eq!(response.flow_status, FlowStatus::Completed);
    let result = response.result.expect("terminal result");
    assert_eq!(result.attributes["mobileNumberVerified"], json!(true));
    assert!(result.user.is_some());
    Ok(())
}

#[tokio::test]
async fn finished_sessions_are_removed() -> Result<(), CoreError> {
    let (orchestrator, _, _) = engine(OrchestratorConfig::default()).await;
    let flow = orchestrator
        .start_flow(&ApplicationId::from("portal"), FlowType::Authentication)
        .await?;
    orchestrator
        .submit_step(&flow.flow_id, StepInput::with_action("password"))
        .await?;
    let response = orchestrator
        .submit_step(
            &flow.flow_id,
            inputs(&[("username", "ada"), ("password", "correct-horse")]),
        )
        .await?;
    assert!(response.is_complete());

    let err = orchestrator
        .submit_step(&flow.flow_id, StepInput::default())
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "FLW-2002");
    Ok(())
}
