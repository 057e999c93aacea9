use crate::types::{ApplicationId, FlowType, GraphId};
use crate::CoreError;
use serde::{Deserialize, Serialize};

/// A client application and the graphs its journeys run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Application ID
    pub id: ApplicationId,

    /// Display name
    pub name: String,

    /// Graph used for sign-in
    pub auth_flow_graph_id: GraphId,

    /// Graph used for self sign-up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_flow_graph_id: Option<GraphId>,

    /// Whether self sign-up is offered at all
    #[serde(default)]
    pub is_registration_flow_enabled: bool,
}

impl Application {
    /// Graph bound to the given purpose
    pub fn graph_for(&self, flow_type: FlowType) -> Result<&GraphId, CoreError> {
        match flow_type {
            FlowType::Authentication => Ok(&self.auth_flow_graph_id),
            FlowType::Registration => {
                if !self.is_registration_flow_enabled {
                    return Err(CoreError::ConfigurationError(format!(
                        "registration is disabled for application {}",
                        self.id
                    )));
                }
                self.registration_flow_graph_id.as_ref().ok_or_else(|| {
                    CoreError::ConfigurationError(format!(
                        "application {} has no registration graph",
                        self.id
                    ))
                })
            }
        }
    }
}
