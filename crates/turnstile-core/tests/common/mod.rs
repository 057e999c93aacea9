//! Minimal in-process collaborators for orchestrator tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use turnstile_core::{
    Application, ApplicationId, ApplicationRepository, CoreError, ExecutorRegistry, FlowId,
    FlowSession, FlowSessionRepository, FlowType, Graph, GraphId, GraphRepository, Orchestrator,
    OrchestratorConfig, TracingEventHandler,
};

#[derive(Default)]
pub struct TestSessions {
    pub sessions: RwLock<HashMap<FlowId, FlowSession>>,
}

#[async_trait]
impl FlowSessionRepository for TestSessions {
    async fn find_by_id(&self, id: &FlowId) -> Result<Option<FlowSession>, CoreError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn save(&self, session: &FlowSession) -> Result<u64, CoreError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions.get(&session.flow_id).map(|s| s.version).unwrap_or(0);
        if stored != session.version {
            return Err(CoreError::Conflict(session.flow_id.to_string()));
        }
        let mut copy = session.clone();
        copy.version += 1;
        sessions.insert(copy.flow_id.clone(), copy);
        Ok(session.version + 1)
    }

    async fn delete(&self, id: &FlowId) -> Result<(), CoreError> {
        self.sessions.write().await.remove(id);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, CoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        Ok(before - sessions.len())
    }
}

#[derive(Default)]
pub struct TestGraphs {
    pub graphs: RwLock<HashMap<GraphId, Arc<Graph>>>,
}

#[async_trait]
impl GraphRepository for TestGraphs {
    async fn find_by_id(&self, id: &GraphId) -> Result<Option<Arc<Graph>>, CoreError> {
        Ok(self.graphs.read().await.get(id).cloned())
    }

    async fn register(&self, graph: Graph) -> Result<(), CoreError> {
        graph.validate()?;
        self.graphs
            .write()
            .await
            .insert(graph.id.clone(), Arc::new(graph));
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<GraphId>, CoreError> {
        Ok(self.graphs.read().await.keys().cloned().collect())
    }
}

#[derive(Default)]
pub struct TestApplications {
    pub applications: RwLock<HashMap<ApplicationId, Application>>,
}

#[async_trait]
impl ApplicationRepository for TestApplications {
    async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<Application>, CoreError> {
        Ok(self.applications.read().await.get(id).cloned())
    }

    async fn save(&self, application: Application) -> Result<(), CoreError> {
        self.applications
            .write()
            .await
            .insert(application.id.clone(), application);
        Ok(())
    }
}

pub struct Harness {
    pub orchestrator: Orchestrator,
    pub sessions: Arc<TestSessions>,
}

pub const APP_ID: &str = "app-1";

/// Route engine logs to the test output; `RUST_LOG` overrides the default filter
pub fn init_test_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("turnstile_core=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Builds an orchestrator whose application runs `graph` for its graph's purpose
pub async fn harness(graph: Graph, registry: ExecutorRegistry, config: OrchestratorConfig) -> Harness {
    init_test_logging();

    let sessions = Arc::new(TestSessions::default());
    let graphs = Arc::new(TestGraphs::default());
    let applications = Arc::new(TestApplications::default());

    let flow_type = graph.flow_type;
    let graph_id = graph.id.clone();
    graphs.register(graph).await.unwrap();

    applications
        .save(Application {
            id: ApplicationId::from(APP_ID),
            name: "Test app".to_string(),
            auth_flow_graph_id: graph_id.clone(),
            registration_flow_graph_id: Some(graph_id),
            is_registration_flow_enabled: flow_type == FlowType::Registration,
        })
        .await
        .unwrap();

    let orchestrator = Orchestrator::new(
        sessions.clone(),
        graphs,
        applications,
        Arc::new(registry),
        Arc::new(TracingEventHandler),
        config,
    );

    Harness {
        orchestrator,
        sessions,
    }
}
