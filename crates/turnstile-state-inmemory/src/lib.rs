//! In-memory state store implementation for the Turnstile flow engine
//!
//! This crate provides in-memory implementations of the repository
//! interfaces defined in turnstile-core and the user directory used by the
//! stock executors. It is primarily useful for development, testing and
//! single-node deployments where sessions may be lost on restart.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use turnstile_core::{
    Application, ApplicationId, ApplicationRepository, FlowId, FlowSession,
    FlowSessionRepository, Graph, GraphId, GraphRepository,
};

pub mod repositories;
pub use repositories::{
    InMemoryApplicationRepository, InMemoryFlowSessionRepository, InMemoryGraphRepository,
};

pub mod sweeper;
pub use sweeper::ExpirySweeper;

pub mod users;
pub use users::{seed_user, InMemoryUserStore, RecordingNotificationSender, SentMessage};

/// Provider for in-memory repositories sharing one set of maps
pub struct InMemoryStateStoreProvider {
    sessions: Arc<RwLock<HashMap<FlowId, FlowSession>>>,
    graphs: Arc<RwLock<HashMap<GraphId, Arc<Graph>>>>,
    applications: Arc<RwLock<HashMap<ApplicationId, Application>>>,
}

impl InMemoryStateStoreProvider {
    /// Create a new in-memory state store provider
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            graphs: Arc::new(RwLock::new(HashMap::new())),
            applications: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create repositories for the orchestrator
    pub fn create_repositories(
        &self,
    ) -> (
        Arc<dyn FlowSessionRepository>,
        Arc<dyn GraphRepository>,
        Arc<dyn ApplicationRepository>,
    ) {
        (
            Arc::new(InMemoryFlowSessionRepository::new(self.sessions.clone())),
            Arc::new(InMemoryGraphRepository::new(self.graphs.clone())),
            Arc::new(InMemoryApplicationRepository::new(self.applications.clone())),
        )
    }
}

impl Default for InMemoryStateStoreProvider {
    fn default() -> Self {
        Self::new()
    }
}
