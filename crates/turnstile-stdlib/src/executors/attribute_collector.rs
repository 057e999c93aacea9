use async_trait::async_trait;
use turnstile_core::{CoreError, ExecutionResult, Executor, ExecutorBase, ExecutorContext};
use crate::executors::{property_list, route, SECRET_INPUTS};

/// Copies collected inputs into session attributes.
///
/// Property `attributes` (comma separated) restricts which inputs are copied.
/// Secrets such as passwords and codes are never copied.
#[derive(Debug, Default)]
pub struct AttributeCollectorExecutor;

impl AttributeCollectorExecutor {
    /// Registered name
    pub const NAME: &'static str = "AttributeCollectorExecutor";

    /// Create the executor
    pub fn new() -> Self {
        Self
    }
}

impl ExecutorBase for AttributeCollectorExecutor {
    fn name(&self) -> &str {
        Self::NAME
    }
}

#[async_trait]
impl Executor for AttributeCollectorExecutor {
    async fn execute(&self, ctx: &ExecutorContext) -> Result<ExecutionResult, CoreError> {
        let allowed = property_list(ctx, "attributes");
        let mut result = ExecutionResult::complete();

        for (name, value) in &ctx.inputs {
            if SECRET_INPUTS.contains(&name.as_str()) || value.is_null() {
                continue;
            }
            if allowed.as_ref().map_or(true, |list| list.contains(name)) {
                result = result.with_attribute(name.clone(), value.clone());
            }
        }

        Ok(route(result, ctx, "onSuccess"))
    }
}
