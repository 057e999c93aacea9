//! Repository traits for the Turnstile flow engine
//!
//! The orchestrator only talks to storage through these traits. External
//! crates implement them to provide different persistence mechanisms.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::application::Application;
use super::flow_session::FlowSession;
use super::graph::Graph;
use crate::types::{ApplicationId, FlowId, GraphId};
use crate::CoreError;

/// Repository for flow sessions
#[async_trait]
pub trait FlowSessionRepository: Send + Sync {
    /// Find a flow session by ID
    async fn find_by_id(&self, id: &FlowId) -> Result<Option<FlowSession>, CoreError>;

    /// Save a flow session, returning its new version.
    ///
    /// `session.version` must equal the stored version (0 for a session not
    /// yet stored), otherwise the save fails with [`CoreError::Conflict`].
    async fn save(&self, session: &FlowSession) -> Result<u64, CoreError>;

    /// Delete a flow session
    async fn delete(&self, id: &FlowId) -> Result<(), CoreError>;

    /// Delete every session whose expiry is at or before `now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, CoreError>;
}

/// Repository for graph definitions
#[async_trait]
pub trait GraphRepository: Send + Sync {
    /// Find a graph by ID
    async fn find_by_id(&self, id: &GraphId) -> Result<Option<Arc<Graph>>, CoreError>;

    /// Validate and store a graph
    async fn register(&self, graph: Graph) -> Result<(), CoreError>;

    /// List the IDs of all stored graphs
    async fn list_ids(&self) -> Result<Vec<GraphId>, CoreError>;

    /// Load a graph, failing when it is unknown
    async fn load(&self, id: &GraphId) -> Result<Arc<Graph>, CoreError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::GraphNotFound(id.to_string()))
    }
}

/// Repository for client applications
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Find an application by ID
    async fn find_by_id(&self, id: &ApplicationId) -> Result<Option<Application>, CoreError>;

    /// Save an application
    async fn save(&self, application: Application) -> Result<(), CoreError>;
}
