//! Federated sign-up against a stubbed identity provider

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use turnstile_core::{
    ApplicationId, CoreError, FlowResponse, FlowStatus, FlowType, Orchestrator, StepInput,
    ValueMap,
};
use turnstile_integration_tests::utils::{application, prompt_node, TestEngineBuilder};
use turnstile_stdlib::IdpEndpoint;

const SOCIAL_SIGNUP: &str = r#"
id: social-signup
type: REGISTRATION
nodes:
  - id: google
    type: TASK_EXECUTION
    start: true
    executor:
      name: FederatedAuthExecutor
      idpName: google
      properties:
        onExistingUser: welcome
        onNewUser: provision
    next: [provision, welcome]
  - id: provision
    type: TASK_EXECUTION
    executor:
      name: ProvisioningExecutor
    next: [welcome]
  - id: welcome
    type: AUTHENTICATION_SUCCESS
"#;

const PASSWORD_LOGIN: &str = r#"
id: login
type: AUTHENTICATION
nodes:
  - id: credentials
    type: TASK_EXECUTION
    inputData:
      - { name: username, type: string, required: true }
      - { name: password, type: string, required: true }
    executor:
      name: BasicAuthExecutor
    next: [done]
  - id: done
    type: AUTHENTICATION_SUCCESS
"#;

async fn stub_provider(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("code=good-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1",
            "token_type": "Bearer"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "g-42",
            "email": "grace@example.com",
            "name": "Grace"
        })))
        .mount(server)
        .await;
}

async fn engine(server: &MockServer) -> Orchestrator {
    TestEngineBuilder::new()
        .with_graph_yaml(PASSWORD_LOGIN)
        .with_graph_yaml(SOCIAL_SIGNUP)
        .with_application(application("portal", "login", Some("social-signup")))
        .with_identity_provider(
            "google",
            IdpEndpoint {
                authorize_url: format!("{}/authorize", server.uri()),
                token_url: format!("{}/token", server.uri()),
                userinfo_url: format!("{}/userinfo", server.uri()),
                client_id: "portal".to_string(),
                client_secret: "shh".to_string(),
                redirect_uri: "https://portal.example/callback".to_string(),
                scope: "openid email".to_string(),
            },
        )
        .build()
        .await
        .orchestrator
}

/// `state` parameter of the redirect URL in a prompt
fn redirect_state(response: &FlowResponse) -> String {
    let url = &response.prompt.as_ref().unwrap().additional_data["redirectUrl"];
    let start = url.find("state=").unwrap() + "state=".len();
    url[start..].split('&').next().unwrap().to_string()
}

fn callback(code: &str, state: &str) -> StepInput {
    StepInput::with_inputs(ValueMap::from([
        ("code".to_string(), json!(code)),
        ("state".to_string(), json!(state)),
    ]))
}

#[tokio::test]
async fn new_identity_is_provisioned_then_linked() {
    let server = MockServer::start().await;
    stub_provider(&server).await;
    let orchestrator = engine(&server).await;
    let portal = ApplicationId::from("portal");

    let flow = orchestrator
        .start_flow(&portal, FlowType::Registration)
        .await
        .unwrap();
    assert_eq!(prompt_node(&flow), "google");
    let prompt = flow.prompt.as_ref().unwrap();
    assert_eq!(prompt.additional_data["idpName"], "google");
    assert!(prompt.additional_data["redirectUrl"].starts_with(&server.uri()));

    let state = redirect_state(&flow);
    let response = orchestrator
        .submit_step(&flow.flow_id, callback("good-code", &state))
        .await
        .unwrap();

    assert_eq!(response.flow_status, FlowStatus::Completed);
    let result = response.result.unwrap();
    let first_user = result.user.unwrap();
    assert_eq!(first_user.username.as_deref(), Some("grace@example.com"));
    assert_eq!(result.attributes["google.subject"], json!("g-42"));
    assert!(!result.attributes.contains_key("code"));

    // The same provider account signs up again and is linked, not duplicated
    let again = orchestrator
        .start_flow(&portal, FlowType::Registration)
        .await
        .unwrap();
    let state = redirect_state(&again);
    let response = orchestrator
        .submit_step(&again.flow_id, callback("good-code", &state))
        .await
        .unwrap();

    assert_eq!(response.flow_status, FlowStatus::Completed);
    assert_eq!(response.result.unwrap().user.unwrap().user_id, first_user.user_id);
}

#[tokio::test]
async fn forged_state_fails_the_flow() {
    let server = MockServer::start().await;
    stub_provider(&server).await;
    let orchestrator = engine(&server).await;

    let flow = orchestrator
        .start_flow(&ApplicationId::from("portal"), FlowType::Registration)
        .await
        .unwrap();
    let response = orchestrator
        .submit_step(&flow.flow_id, callback("good-code", "forged"))
        .await
        .unwrap();

    assert_eq!(response.flow_status, FlowStatus::Failed);
    let result = response.result.unwrap();
    assert!(result.user.is_none());
    assert!(result.error_code.is_some());
}

#[tokio::test]
async fn callback_without_state_is_rejected() {
    let server = MockServer::start().await;
    stub_provider(&server).await;
    let orchestrator = engine(&server).await;

    let flow = orchestrator
        .start_flow(&ApplicationId::from("portal"), FlowType::Registration)
        .await
        .unwrap();
    let code_only = StepInput::with_inputs(ValueMap::from([("code".to_string(), json!("good-code"))]));
    let err = orchestrator
        .submit_step(&flow.flow_id, code_only)
        .await
        .unwrap_err();

    match err {
        CoreError::InputValidation(violations) => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].field, "state");
        }
        other => panic!("expected InputValidation, got {:?}", other),
    }
    let session = orchestrator.get_session(&flow.flow_id).await.unwrap();
    assert_eq!(session.status, FlowStatus::InProgress);
    assert!(session.authenticated_user.is_none());

    // No code was exchanged
    let exchanges = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == "/token")
        .count();
    assert_eq!(exchanges, 0);
}

#[tokio::test]
async fn rejected_code_restarts_the_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&server)
        .await;
    let orchestrator = engine(&server).await;

    let flow = orchestrator
        .start_flow(&ApplicationId::from("portal"), FlowType::Registration)
        .await
        .unwrap();
    let state = redirect_state(&flow);
    let response = orchestrator
        .submit_step(&flow.flow_id, callback("stale-code", &state))
        .await
        .unwrap();

    assert_eq!(response.flow_status, FlowStatus::InProgress);
    assert_eq!(prompt_node(&response), "google");
    let prompt = response.prompt.unwrap();
    assert_eq!(
        prompt.failure_reason.as_deref(),
        Some("Sign-in with google failed, please try again")
    );
    // A fresh redirect carrying a new state
    let fresh = prompt.additional_data["redirectUrl"].clone();
    assert!(fresh.starts_with(&server.uri()));
    assert!(!fresh.contains(&state));
}
