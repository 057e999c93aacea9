//! Stock executors for common identity steps

pub mod attribute_collector;
pub mod basic_auth;
pub mod federated;
pub mod provisioning;
pub mod sms_otp;

pub use attribute_collector::AttributeCollectorExecutor;
pub use basic_auth::BasicAuthExecutor;
pub use federated::FederatedAuthExecutor;
pub use provisioning::ProvisioningExecutor;
pub use sms_otp::{OtpSettings, SmsOtpExecutor};

use turnstile_core::{ExecutionResult, ExecutorContext, InputField, InputType};

/// Inputs that are never copied into attributes or user profiles
pub(crate) const SECRET_INPUTS: [&str; 4] = ["password", "otp", "code", "state"];

pub(crate) fn required_string(name: &str) -> InputField {
    InputField::new(name, InputType::String, true)
}

/// Non-empty string from the collected inputs, falling back to attributes
pub(crate) fn lookup_string(ctx: &ExecutorContext, name: &str) -> Option<String> {
    ctx.inputs
        .get(name)
        .or_else(|| ctx.attributes.get(name))
        .and_then(|value| value.as_str())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Route to the successor named by `property`, when the node configures one
pub(crate) fn route(result: ExecutionResult, ctx: &ExecutorContext, property: &str) -> ExecutionResult {
    match ctx.property(property) {
        Some(target) => result.with_outcome(target),
        None => result,
    }
}

/// Comma separated property value as a list
pub(crate) fn property_list(ctx: &ExecutorContext, property: &str) -> Option<Vec<String>> {
    ctx.property(property).map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
}
