use std::sync::Arc;
use async_trait::async_trait;
use tracing::debug;
use turnstile_core::{CoreError, ExecutionResult, Executor, ExecutorBase, ExecutorContext};
use crate::executors::{required_string, route};
use crate::services::UserStore;

/// Checks a username and password against the local user store.
///
/// Wrong credentials are recoverable; the orchestrator counts the retry.
/// Node property `onSuccess` names the successor when there is more than one.
pub struct BasicAuthExecutor {
    users: Arc<dyn UserStore>,
}

impl BasicAuthExecutor {
    /// Registered name
    pub const NAME: &'static str = "BasicAuthExecutor";

    /// Create the executor over a user store
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}

impl ExecutorBase for BasicAuthExecutor {
    fn name(&self) -> &str {
        Self::NAME
    }
}

#[async_trait]
impl Executor for BasicAuthExecutor {
    async fn execute(&self, ctx: &ExecutorContext) -> Result<ExecutionResult, CoreError> {
        let (username, password) = match (ctx.input_str("username"), ctx.input_str("password")) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
            _ => {
                return Ok(ExecutionResult::user_input_required(vec![
                    required_string("username"),
                    required_string("password"),
                ]))
            }
        };

        match self.users.authenticate(username, password).await? {
            Some(record) => {
                debug!(flow_id = %ctx.flow_id, user_id = %record.user_id, "Credentials accepted");
                let result = ExecutionResult::complete()
                    .with_attribute("username", serde_json::Value::String(username.to_string()))
                    .with_user(record.into());
                Ok(route(result, ctx, "onSuccess"))
            }
            None => {
                debug!(flow_id = %ctx.flow_id, "Credentials rejected");
                Ok(ExecutionResult::retry("Invalid username or password"))
            }
        }
    }
}
