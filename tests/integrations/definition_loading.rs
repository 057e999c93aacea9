//! Graph files loaded from disk and registered with the engine

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use turnstile_core::{
    ApplicationId, CoreError, FlowType, Graph, GraphId, GraphRepository, Node, NodeKind,
};
use turnstile_dsl::{load_graphs_from_dir, DslError};
use turnstile_integration_tests::utils::{application, prompt_node, TestEngineBuilder};
use turnstile_state_inmemory::InMemoryGraphRepository;

const PASSWORD_LOGIN: &str = r#"{
  "id": "password-login",
  "type": "AUTHENTICATION",
  "nodes": [
    {
      "id": "credentials",
      "type": "TASK_EXECUTION",
      "inputData": [
        { "name": "username", "type": "string", "required": true },
        { "name": "password", "type": "string", "required": true }
      ],
      "executor": { "name": "BasicAuthExecutor" },
      "next": ["done"]
    },
    { "id": "done", "type": "AUTHENTICATION_SUCCESS" },
    { "id": "orphan", "type": "AUTHENTICATION_FAILURE" }
  ]
}"#;

const DANGLING: &str = r#"
id: dangling
type: AUTHENTICATION
nodes:
  - id: ask
    type: PROMPT_ONLY
    next: [nowhere]
"#;

#[tokio::test]
async fn loaded_graphs_register_and_run() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("password-login.json"), PASSWORD_LOGIN).unwrap();

    let graphs = load_graphs_from_dir(dir.path()).unwrap();
    assert_eq!(graphs.len(), 1);

    // Unreachable nodes are reported but do not block registration
    let repository = InMemoryGraphRepository::default();
    for graph in graphs {
        repository.register(graph).await.unwrap();
    }
    assert_eq!(
        repository.list_ids().await.unwrap(),
        vec![GraphId::from("password-login")]
    );

    let engine = TestEngineBuilder::new()
        .with_graph_yaml(PASSWORD_LOGIN)
        .with_application(application("portal", "password-login", None))
        .build()
        .await;
    let response = engine
        .orchestrator
        .start_flow(&ApplicationId::from("portal"), FlowType::Authentication)
        .await
        .unwrap();
    assert_eq!(prompt_node(&response), "credentials");

    let prompt = response.prompt.unwrap();
    let names: Vec<_> = prompt.inputs.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["username", "password"]);
}

#[tokio::test]
async fn dangling_references_never_load() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a-good.json"), PASSWORD_LOGIN).unwrap();
    fs::write(dir.path().join("b-dangling.yaml"), DANGLING).unwrap();

    let err = load_graphs_from_dir(dir.path()).unwrap_err();
    assert_eq!(err.error_code(), "ERR_DSL_VALIDATION_INVALID_REFERENCE");
    assert!(matches!(
        err,
        DslError::ValidationError(_) | DslError::MultipleValidationErrors(_)
    ));

    // Graphs built in code go through the same check on registration
    let repository = InMemoryGraphRepository::default();
    let graph = Graph::new(
        "dangling",
        FlowType::Authentication,
        vec![Node::new("ask", NodeKind::PromptOnly).with_next(&["nowhere"])],
    );
    assert!(matches!(
        repository.register(graph).await,
        Err(CoreError::GraphInvalid(_))
    ));
    assert!(repository.list_ids().await.unwrap().is_empty());
}

#[tokio::test]
async fn application_bound_to_wrong_graph_type_is_refused() {
    let engine = TestEngineBuilder::new()
        .with_graph_yaml(PASSWORD_LOGIN)
        .with_application(application("mixed", "password-login", Some("password-login")))
        .build()
        .await;

    let err = engine
        .orchestrator
        .start_flow(&ApplicationId::from("mixed"), FlowType::Registration)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "FLW-5006");
    assert!(err.is_internal());
}

#[tokio::test]
async fn unknown_application_is_reported() {
    let engine = TestEngineBuilder::new()
        .with_graph_yaml(PASSWORD_LOGIN)
        .build()
        .await;
    let err = engine
        .orchestrator
        .start_flow(&ApplicationId::from("ghost"), FlowType::Authentication)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ApplicationNotFound(_)));
    assert!(!err.is_internal());
}
