// Turnstile Integration Tests
//
// End-to-end journeys across the DSL loader, the stock executors, the
// in-memory repositories and the orchestrator.

/// Shared test infrastructure for integration tests
pub mod utils {
    use std::collections::HashMap;
    use std::sync::Arc;

    use turnstile_core::{
        Application, ApplicationId, ApplicationRepository, Executor, ExecutorRegistry,
        FlowResponse, FlowSessionRepository, GraphId, GraphRepository, Orchestrator,
        OrchestratorConfig, TracingEventHandler, ValueMap,
    };
    use turnstile_state_inmemory::{
        seed_user, InMemoryStateStoreProvider, InMemoryUserStore, RecordingNotificationSender,
    };
    use turnstile_stdlib::{
        register_defaults, HttpIdentityProviderClient, IdpEndpoint, OtpSettings, StdlibServices,
        UserStore,
    };

    /// A wired engine plus handles on its collaborators
    pub struct TestEngine {
        pub orchestrator: Orchestrator,
        pub sessions: Arc<dyn FlowSessionRepository>,
        pub graphs: Arc<dyn GraphRepository>,
        pub users: Arc<InMemoryUserStore>,
        pub sms: RecordingNotificationSender,
    }

    /// Builder for [`TestEngine`]
    #[derive(Default)]
    pub struct TestEngineBuilder {
        graphs: Vec<String>,
        applications: Vec<Application>,
        users: Vec<(String, String, ValueMap)>,
        executors: Vec<Arc<dyn Executor>>,
        providers: HashMap<String, IdpEndpoint>,
        config: OrchestratorConfig,
    }

    impl TestEngineBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a YAML graph definition
        pub fn with_graph_yaml(mut self, yaml: &str) -> Self {
            self.graphs.push(yaml.to_string());
            self
        }

        pub fn with_application(mut self, application: Application) -> Self {
            self.applications.push(application);
            self
        }

        pub fn with_user(mut self, username: &str, password: &str, attributes: ValueMap) -> Self {
            self.users
                .push((username.to_string(), password.to_string(), attributes));
            self
        }

        /// Register an executor next to the stock ones
        pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
            self.executors.push(executor);
            self
        }

        pub fn with_identity_provider(mut self, name: &str, endpoint: IdpEndpoint) -> Self {
            self.providers.insert(name.to_string(), endpoint);
            self
        }

        pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
            self.config = config;
            self
        }

        pub async fn build(self) -> TestEngine {
            let provider = InMemoryStateStoreProvider::new();
            let (sessions, graphs, applications) = provider.create_repositories();

            for yaml in &self.graphs {
                let graph = turnstile_dsl::parse_graph_yaml(yaml).unwrap();
                graphs.register(graph).await.unwrap();
            }
            for application in self.applications {
                applications.save(application).await.unwrap();
            }

            let users = Arc::new(InMemoryUserStore::new());
            for (username, password, attributes) in self.users {
                users
                    .create(seed_user(&username, &password, attributes))
                    .await
                    .unwrap();
            }

            let sms = RecordingNotificationSender::new();
            let services = StdlibServices {
                users: users.clone(),
                notifications: Arc::new(sms.clone()),
                identity_providers: Arc::new(HttpIdentityProviderClient::new(self.providers).unwrap()),
                otp: OtpSettings::default(),
            };

            let mut registry = ExecutorRegistry::new();
            register_defaults(&mut registry, &services).unwrap();
            for executor in self.executors {
                registry.register(executor).unwrap();
            }

            let orchestrator = Orchestrator::new(
                sessions.clone(),
                graphs.clone(),
                applications,
                Arc::new(registry),
                Arc::new(TracingEventHandler),
                self.config,
            );

            TestEngine {
                orchestrator,
                sessions,
                graphs,
                users,
                sms,
            }
        }
    }

    /// Application bound to one sign-in graph and an optional sign-up graph
    pub fn application(id: &str, auth_graph: &str, registration_graph: Option<&str>) -> Application {
        Application {
            id: ApplicationId::from(id),
            name: format!("{} application", id),
            auth_flow_graph_id: GraphId::from(auth_graph),
            registration_flow_graph_id: registration_graph.map(GraphId::from),
            is_registration_flow_enabled: registration_graph.is_some(),
        }
    }

    /// Node the response prompts for
    pub fn prompt_node(response: &FlowResponse) -> &str {
        response
            .prompt
            .as_ref()
            .map(|prompt| prompt.node_id.as_str())
            .unwrap_or_default()
    }

    /// Passcode from the latest SMS to `recipient`
    pub async fn last_code(sms: &RecordingNotificationSender, recipient: &str) -> String {
        let message = sms.last_message_to(recipient).await.unwrap_or_default();
        message
            .split_whitespace()
            .last()
            .unwrap_or_default()
            .to_string()
    }
}
