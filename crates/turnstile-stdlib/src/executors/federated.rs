use std::sync::Arc;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use turnstile_core::{
    AuthenticatedUser, CoreError, ExecutionResult, Executor, ExecutorBase, ExecutorContext,
    FlowType,
};
use crate::executors::{required_string, route};
use crate::services::{IdentityProviderClient, ServiceError, UserStore};

const STATE_KEY: &str = "federated.state";

/// Two-phase OAuth2 authorization-code sign-in with an external provider.
///
/// The first call stores a random `state` and hands back a `redirectUrl`.
/// The second exchanges the returned `code`; the callback must echo `state`
/// or the flow fails. When a local account is linked
/// to the provider subject (attribute `<idp>.subject`) it becomes the
/// authenticated user and the node routes to `onExistingUser`; otherwise
/// registration flows continue to `onNewUser` with the provider claims as
/// attributes, and authentication flows sign in the external identity.
pub struct FederatedAuthExecutor {
    client: Arc<dyn IdentityProviderClient>,
    users: Arc<dyn UserStore>,
}

impl FederatedAuthExecutor {
    /// Registered name
    pub const NAME: &'static str = "FederatedAuthExecutor";

    /// Create the executor
    pub fn new(client: Arc<dyn IdentityProviderClient>, users: Arc<dyn UserStore>) -> Self {
        Self { client, users }
    }

    fn redirect(&self, ctx: &ExecutorContext, idp: &str) -> Result<ExecutionResult, CoreError> {
        self.with_redirect(
            ExecutionResult::user_input_required(vec![
                required_string("code"),
                required_string("state"),
            ]),
            ctx,
            idp,
        )
    }

    /// Attach a fresh `state` and the provider URL carrying it
    fn with_redirect(
        &self,
        result: ExecutionResult,
        ctx: &ExecutorContext,
        idp: &str,
    ) -> Result<ExecutionResult, CoreError> {
        let state = uuid::Uuid::new_v4().simple().to_string();
        let url = self.client.authorization_url(idp, &state)?;
        debug!(flow_id = %ctx.flow_id, idp = idp, "Redirecting to identity provider");

        Ok(result
            .with_runtime_data(STATE_KEY, state)
            .with_additional_data("redirectUrl", url)
            .with_additional_data("idpName", idp))
    }
}

impl ExecutorBase for FederatedAuthExecutor {
    fn name(&self) -> &str {
        Self::NAME
    }
}

#[async_trait]
impl Executor for FederatedAuthExecutor {
    async fn execute(&self, ctx: &ExecutorContext) -> Result<ExecutionResult, CoreError> {
        let idp = ctx.idp_name.as_deref().ok_or_else(|| {
            CoreError::ConfigurationError(format!(
                "node '{}' runs {} without an idpName",
                ctx.node_id,
                Self::NAME
            ))
        })?;

        let Some(expected_state) = ctx.runtime(STATE_KEY) else {
            return self.redirect(ctx, idp);
        };

        let Some(code) = ctx.input_str("code").filter(|code| !code.is_empty()) else {
            return Ok(ExecutionResult::user_input_required(vec![required_string("code")]));
        };

        match ctx.input_str("state") {
            Some(state) if state == expected_state => {}
            Some(_) => {
                warn!(flow_id = %ctx.flow_id, idp = idp, "State mismatch on federated callback");
                return Ok(ExecutionResult::failure("state parameter does not match"));
            }
            None => {
                warn!(flow_id = %ctx.flow_id, idp = idp, "Federated callback without state");
                return Ok(ExecutionResult::failure("state parameter is missing"));
            }
        }

        let identity = match self.client.exchange_code(idp, code).await {
            Ok(identity) => identity,
            Err(ServiceError::Rejected(reason)) => {
                debug!(flow_id = %ctx.flow_id, idp = idp, reason = %reason, "Code exchange rejected");
                let retry = ExecutionResult::retry(format!("Sign-in with {} failed, please try again", idp));
                return self.with_redirect(retry, ctx, idp);
            }
            Err(err) => return Err(err.into()),
        };

        let subject_attribute = format!("{}.subject", idp);
        let mut result = ExecutionResult::complete()
            .with_attribute(subject_attribute.clone(), Value::String(identity.subject.clone()))
            .clear_runtime_data(STATE_KEY);
        if let Some(email) = &identity.email {
            result = result.with_attribute("email", Value::String(email.clone()));
        }
        for (name, value) in &identity.claims {
            result = result.with_attribute(format!("{}.{}", idp, name), value.clone());
        }

        if let Some(record) = self
            .users
            .find_by_attribute(&subject_attribute, &identity.subject)
            .await?
        {
            debug!(flow_id = %ctx.flow_id, user_id = %record.user_id, "Linked federated identity");
            return Ok(route(result.with_user(record.into()), ctx, "onExistingUser"));
        }

        match ctx.flow_type {
            FlowType::Registration => Ok(route(result, ctx, "onNewUser")),
            FlowType::Authentication => {
                let mut user = AuthenticatedUser::new(format!("{}:{}", idp, identity.subject));
                user.username = identity.email.clone();
                user.attributes = identity.claims.clone();
                Ok(route(result.with_user(user), ctx, "onNewUser"))
            }
        }
    }
}
