use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Name-to-value map of caller inputs or session attributes
pub type ValueMap = HashMap<String, serde_json::Value>;

/// Executor-private string state carried across round trips
pub type RuntimeData = HashMap<String, String>;

/// Unique identifier of a flow session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FlowId(pub String);

/// Identifier of a graph definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GraphId(pub String);

/// Identifier of a node within a graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NodeId(pub String);

/// Identifier of a client application
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ApplicationId(pub String);

macro_rules! impl_id {
    ($($name:ident),*) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }

            impl $name {
                /// Borrow the raw identifier
                #[inline]
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }
        )*
    };
}

impl_id!(FlowId, GraphId, NodeId, ApplicationId);

/// Purpose of a journey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowType {
    /// Sign-in journey
    Authentication,
    /// Self sign-up journey
    Registration,
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowType::Authentication => f.write_str("AUTHENTICATION"),
            FlowType::Registration => f.write_str("REGISTRATION"),
        }
    }
}

/// Identity established by an executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    /// Local user identifier
    pub user_id: String,

    /// Username or other login handle, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Claims gathered about the user
    #[serde(default)]
    pub attributes: ValueMap,
}

impl AuthenticatedUser {
    /// Create a user with no extra claims
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: None,
            attributes: ValueMap::new(),
        }
    }
}
