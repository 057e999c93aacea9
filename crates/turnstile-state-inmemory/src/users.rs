//! In-memory user directory and message recorder

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use rand::RngCore;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::{debug, info};

use turnstile_core::ValueMap;
use turnstile_stdlib::{NewUser, NotificationSender, ServiceError, UserRecord, UserStore};

struct StoredUser {
    record: UserRecord,
    salt: String,
    password_digest: Option<String>,
}

/// User store kept in process memory. Passwords are stored as salted
/// SHA-256 digests.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, StoredUser>>>,
}

impl InMemoryUserStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts
    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}

fn password_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn new_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserRecord>, ServiceError> {
        let users = self.users.read().await;
        let matched = users.values().find(|user| {
            user.record.username.as_deref() == Some(username)
                && user
                    .password_digest
                    .as_deref()
                    .map_or(false, |digest| digest == password_digest(&user.salt, password))
        });
        Ok(matched.map(|user| user.record.clone()))
    }

    async fn find_by_attribute(&self, name: &str, value: &str) -> Result<Option<UserRecord>, ServiceError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.record.attributes.get(name).and_then(Value::as_str) == Some(value))
            .map(|user| user.record.clone()))
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, ServiceError> {
        let mut users = self.users.write().await;

        if let Some(username) = &user.username {
            if users
                .values()
                .any(|existing| existing.record.username.as_ref() == Some(username))
            {
                debug!(username = %username, "Username already taken");
                return Err(ServiceError::Duplicate(username.clone()));
            }
        }

        let salt = new_salt();
        let password_digest = user.password.as_deref().map(|p| password_digest(&salt, p));
        let record = UserRecord {
            user_id: uuid::Uuid::new_v4().to_string(),
            username: user.username,
            attributes: user.attributes,
        };

        info!(user_id = %record.user_id, "Created user");
        users.insert(
            record.user_id.clone(),
            StoredUser {
                record: record.clone(),
                salt,
                password_digest,
            },
        );
        Ok(record)
    }

    async fn update_attributes(&self, user_id: &str, attributes: ValueMap) -> Result<Option<UserRecord>, ServiceError> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(None);
        };

        user.record.attributes.extend(attributes);
        debug!(user_id = %user_id, "Updated user attributes");
        Ok(Some(user.record.clone()))
    }
}

/// A delivered message
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    /// Phone number
    pub recipient: String,
    /// Message body
    pub body: String,
}

/// Notification sender that keeps every message for inspection
#[derive(Clone, Default)]
pub struct RecordingNotificationSender {
    sent: Arc<RwLock<Vec<SentMessage>>>,
}

impl RecordingNotificationSender {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message sent so far, oldest first
    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.read().await.clone()
    }

    /// Body of the latest message sent to `recipient`
    pub async fn last_message_to(&self, recipient: &str) -> Option<String> {
        self.sent
            .read()
            .await
            .iter()
            .rev()
            .find(|m| m.recipient == recipient)
            .map(|m| m.body.clone())
    }
}

#[async_trait]
impl NotificationSender for RecordingNotificationSender {
    async fn send_sms(&self, recipient: &str, message: &str) -> Result<(), ServiceError> {
        self.sent.write().await.push(SentMessage {
            recipient: recipient.to_string(),
            body: message.to_string(),
        });
        Ok(())
    }
}

/// Seed account for development hosts
pub fn seed_user(username: &str, password: &str, attributes: ValueMap) -> NewUser {
    NewUser {
        username: Some(username.to_string()),
        password: Some(password.to_string()),
        attributes,
    }
}
