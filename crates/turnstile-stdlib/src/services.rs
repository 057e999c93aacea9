//! Collaborators the stock executors depend on.
//!
//! Hosts provide implementations; `turnstile-state-inmemory` ships in-memory
//! versions and [`crate::idp_client::HttpIdentityProviderClient`] talks to
//! real OAuth2 providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use turnstile_core::{AuthenticatedUser, CoreError, ValueMap};

/// Errors raised by collaborator services
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// A record with the same unique key already exists
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// The remote party refused the request (bad code, revoked grant)
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The backing service could not be reached or answered badly
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Service is not set up for this request
    #[error("Misconfigured: {0}")]
    Misconfigured(String),
}

impl ServiceError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Duplicate(_) => "ERR_SERVICE_DUPLICATE",
            ServiceError::Rejected(_) => "ERR_SERVICE_REJECTED",
            ServiceError::Unavailable(_) => "ERR_SERVICE_UNAVAILABLE",
            ServiceError::Misconfigured(_) => "ERR_SERVICE_MISCONFIGURED",
        }
    }
}

impl From<ServiceError> for CoreError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Misconfigured(msg) => CoreError::ConfigurationError(msg),
            other => CoreError::ExecutorFailure(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Unavailable(err.to_string())
    }
}

/// A local user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Stable identifier
    pub user_id: String,

    /// Login handle
    pub username: Option<String>,

    /// Profile claims
    #[serde(default)]
    pub attributes: ValueMap,
}

impl From<UserRecord> for AuthenticatedUser {
    fn from(record: UserRecord) -> Self {
        AuthenticatedUser {
            user_id: record.user_id,
            username: record.username,
            attributes: record.attributes,
        }
    }
}

/// Data for a new account
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewUser {
    /// Login handle
    pub username: Option<String>,

    /// Plain-text password; stores keep only a digest
    pub password: Option<String>,

    /// Profile claims
    pub attributes: ValueMap,
}

/// Local user directory
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Check credentials; `None` when they do not match an account
    async fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserRecord>, ServiceError>;

    /// Find the account whose attribute `name` equals `value`
    async fn find_by_attribute(&self, name: &str, value: &str) -> Result<Option<UserRecord>, ServiceError>;

    /// Create an account. Fails with [`ServiceError::Duplicate`] when the
    /// username is taken.
    async fn create(&self, user: NewUser) -> Result<UserRecord, ServiceError>;

    /// Merge attributes into an existing account; `None` when there is no
    /// account with that id
    async fn update_attributes(&self, user_id: &str, attributes: ValueMap) -> Result<Option<UserRecord>, ServiceError>;
}

/// Out-of-band message delivery
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Deliver a text message to a phone number
    async fn send_sms(&self, recipient: &str, message: &str) -> Result<(), ServiceError>;
}

/// Identity established by an external provider
#[derive(Debug, Clone, PartialEq)]
pub struct FederatedIdentity {
    /// Provider's subject identifier
    pub subject: String,

    /// Verified email, when released
    pub email: Option<String>,

    /// Remaining claims
    pub claims: ValueMap,
}

/// OAuth2 authorization-code client for external identity providers
#[async_trait]
pub trait IdentityProviderClient: Send + Sync {
    /// URL the user agent is sent to; `state` must come back with the code
    fn authorization_url(&self, idp_name: &str, state: &str) -> Result<String, ServiceError>;

    /// Exchange an authorization code for the user's identity
    async fn exchange_code(&self, idp_name: &str, code: &str) -> Result<FederatedIdentity, ServiceError>;
}
