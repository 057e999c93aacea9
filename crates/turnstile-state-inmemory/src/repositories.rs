use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use turnstile_core::{
    Application, ApplicationId, ApplicationRepository, CoreError, FlowId, FlowSession,
    FlowSessionRepository, Graph, GraphId, GraphRepository,
};

/// In-memory implementation of the FlowSessionRepository.
///
/// Saves are compare-and-set on the session version, so two writers that
/// loaded the same version cannot both succeed.
pub struct InMemoryFlowSessionRepository {
    sessions: Arc<RwLock<HashMap<FlowId, FlowSession>>>,
}

impl InMemoryFlowSessionRepository {
    /// Create a repository over shared storage
    pub fn new(sessions: Arc<RwLock<HashMap<FlowId, FlowSession>>>) -> Self {
        Self { sessions }
    }

    /// Number of stored sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are stored
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for InMemoryFlowSessionRepository {
    fn default() -> Self {
        Self::new(Arc::new(RwLock::new(HashMap::new())))
    }
}

#[async_trait]
impl FlowSessionRepository for InMemoryFlowSessionRepository {
    async fn find_by_id(&self, id: &FlowId) -> Result<Option<FlowSession>, CoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id).cloned())
    }

    async fn save(&self, session: &FlowSession) -> Result<u64, CoreError> {
        let mut sessions = self.sessions.write().await;

        let stored_version = sessions.get(&session.flow_id).map_or(0, |s| s.version);
        if stored_version != session.version {
            warn!(
                flow_id = %session.flow_id,
                expected = session.version,
                stored = stored_version,
                "Rejected stale session save"
            );
            return Err(CoreError::Conflict(format!(
                "session {} was modified concurrently",
                session.flow_id
            )));
        }

        let mut stored = session.clone();
        stored.version = session.version + 1;
        let version = stored.version;
        sessions.insert(stored.flow_id.clone(), stored);

        debug!(flow_id = %session.flow_id, version, "Saved flow session");
        Ok(version)
    }

    async fn delete(&self, id: &FlowId) -> Result<(), CoreError> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id);
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, CoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(now));
        Ok(before - sessions.len())
    }
}

/// In-memory implementation of the GraphRepository.
///
/// Graphs are validated on registration; an invalid graph is never stored.
pub struct InMemoryGraphRepository {
    graphs: Arc<RwLock<HashMap<GraphId, Arc<Graph>>>>,
}

impl InMemoryGraphRepository {
    /// Create a repository over shared storage
    pub fn new(graphs: Arc<RwLock<HashMap<GraphId, Arc<Graph>>>>) -> Self {
        Self { graphs }
    }
}

impl Default for InMemoryGraphRepository {
    fn default() -> Self {
        Self::new(Arc::new(RwLock::new(HashMap::new())))
    }
}

#[async_trait]
impl GraphRepository for InMemoryGraphRepository {
    async fn find_by_id(&self, id: &GraphId) -> Result<Option<Arc<Graph>>, CoreError> {
        let graphs = self.graphs.read().await;
        Ok(graphs.get(id).cloned())
    }

    async fn register(&self, graph: Graph) -> Result<(), CoreError> {
        graph.validate()?;
        for unreachable in graph.unreachable_nodes() {
            warn!(graph_id = %graph.id, node_id = %unreachable, "Node is unreachable from the start node");
        }

        let mut graphs = self.graphs.write().await;
        if graphs.contains_key(&graph.id) {
            debug!(graph_id = %graph.id, "Replacing graph definition");
        }
        graphs.insert(graph.id.clone(), Arc::new(graph));
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<GraphId>, CoreError> {
        let graphs = self.graphs.read().await;
        let mut ids: Vec<GraphId> = graphs.keys().cloned().collect();
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(ids)
    }
}

/// In-memory implementation of the ApplicationRepository
pub struct InMemoryApplicationRepository {
    applications: Arc<RwLock<HashMap<ApplicationId, Application>>>,
}

impl InMemoryApplicationRepository {
    /// Create a repository over shared storage
    pub fn new(applications: Arc<RwLock<HashMap<ApplicationId, Application>>>) -> Self {
        Self { applications }
    }
}

impl Default for InMemoryApplicationRepository {
    fn default() -> Self {
        Self::new(Arc::new(RwLock::new(HashMap::new())))
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<Application>, CoreError> {
        let applications = self.applications.read().await;
        Ok(applications.get(id).cloned())
    }

    async fn save(&self, application: Application) -> Result<(), CoreError> {
        let mut applications = self.applications.write().await;
        applications.insert(application.id.clone(), application);
        Ok(())
    }
}
