use std::sync::Arc;
use async_trait::async_trait;
use tracing::{debug, info, warn};
use turnstile_core::{CoreError, ExecutionResult, Executor, ExecutorBase, ExecutorContext, ValueMap};
use crate::executors::{lookup_string, property_list, required_string, route, SECRET_INPUTS};
use crate::services::{NewUser, ServiceError, UserStore};

/// Creates or updates the local account from everything the flow has gathered.
///
/// Attributes are the session attributes plus every non-secret collected
/// input. When an earlier node already established a user, those attributes
/// are merged into that account. Otherwise a new account is created with the
/// username taken from `username`, falling back to `email`; an existing
/// username is not recoverable and fails the flow.
/// Property `requiredAttributes` (comma separated) lists attributes that must
/// be present first; missing ones are requested.
pub struct ProvisioningExecutor {
    users: Arc<dyn UserStore>,
}

impl ProvisioningExecutor {
    /// Registered name
    pub const NAME: &'static str = "ProvisioningExecutor";

    /// Create the executor over a user store
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}

impl ExecutorBase for ProvisioningExecutor {
    fn name(&self) -> &str {
        Self::NAME
    }
}

#[async_trait]
impl Executor for ProvisioningExecutor {
    async fn execute(&self, ctx: &ExecutorContext) -> Result<ExecutionResult, CoreError> {
        let mut attributes: ValueMap = ctx.attributes.clone();
        for (name, value) in &ctx.inputs {
            if !SECRET_INPUTS.contains(&name.as_str()) && name != "username" && !value.is_null() {
                attributes.insert(name.clone(), value.clone());
            }
        }

        if let Some(required) = property_list(ctx, "requiredAttributes") {
            let missing: Vec<_> = required
                .iter()
                .filter(|name| attributes.get(name.as_str()).map_or(true, |v| v.is_null() || v == ""))
                .map(|name| required_string(name))
                .collect();
            if !missing.is_empty() {
                return Ok(ExecutionResult::user_input_required(missing));
            }
        }

        if let Some(current) = &ctx.authenticated_user {
            if let Some(record) = self
                .users
                .update_attributes(&current.user_id, attributes.clone())
                .await?
            {
                info!(flow_id = %ctx.flow_id, user_id = %record.user_id, "Updated provisioned user");
                return Ok(route(ExecutionResult::complete().with_user(record.into()), ctx, "onSuccess"));
            }
            // Identity from an external provider with no local account yet
            debug!(flow_id = %ctx.flow_id, user_id = %current.user_id, "Linking identity to a new account");
        }

        let user = NewUser {
            username: lookup_string(ctx, "username").or_else(|| lookup_string(ctx, "email")),
            password: ctx.input_str("password").map(str::to_string),
            attributes,
        };

        match self.users.create(user).await {
            Ok(record) => {
                info!(flow_id = %ctx.flow_id, user_id = %record.user_id, "Provisioned user");
                Ok(route(ExecutionResult::complete().with_user(record.into()), ctx, "onSuccess"))
            }
            Err(ServiceError::Duplicate(key)) => {
                warn!(flow_id = %ctx.flow_id, key = %key, "Provisioning rejected a duplicate user");
                Ok(ExecutionResult::failure(format!("user '{}' already exists", key)))
            }
            Err(err) => Err(err.into()),
        }
    }
}
