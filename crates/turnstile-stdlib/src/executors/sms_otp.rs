use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use turnstile_core::{
    CoreError, ExecutionResult, Executor, ExecutorBase, ExecutorContext, FlowId, FlowType,
};
use crate::executors::{lookup_string, required_string, route};
use crate::services::{NotificationSender, UserStore};

const DIGEST_KEY: &str = "otp.digest";
const EXPIRES_AT_KEY: &str = "otp.expiresAt";
const RECIPIENT_KEY: &str = "otp.recipient";

/// Defaults for generated codes; nodes may override them with the
/// `codeLength` and `validitySeconds` properties.
#[derive(Debug, Clone)]
pub struct OtpSettings {
    /// Number of digits
    pub code_length: usize,
    /// How long a code stays valid
    pub validity: Duration,
}

impl Default for OtpSettings {
    fn default() -> Self {
        Self {
            code_length: 6,
            validity: Duration::minutes(5),
        }
    }
}

/// Two-phase SMS one-time passcode.
///
/// The first call sends a code to `mobileNumber` and asks for `otp`; only a
/// SHA-256 digest of the code and its expiry are kept in runtime data. The
/// second call verifies the submitted code. A wrong code is recoverable, an
/// expired one restarts the exchange.
///
/// After verification the account holding the number becomes the
/// authenticated user. Registration flows continue without one so a later
/// provisioning step can create it. Set `resolveUser` to `false` when the
/// code is a second factor and the user is already known.
pub struct SmsOtpExecutor {
    users: Arc<dyn UserStore>,
    sender: Arc<dyn NotificationSender>,
    settings: OtpSettings,
}

impl SmsOtpExecutor {
    /// Registered name
    pub const NAME: &'static str = "SmsOtpExecutor";

    /// Create the executor
    pub fn new(
        users: Arc<dyn UserStore>,
        sender: Arc<dyn NotificationSender>,
        settings: OtpSettings,
    ) -> Self {
        Self {
            users,
            sender,
            settings,
        }
    }

    fn code_length(&self, ctx: &ExecutorContext) -> usize {
        ctx.property("codeLength")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|len| (4..=10).contains(len))
            .unwrap_or(self.settings.code_length)
    }

    fn validity(&self, ctx: &ExecutorContext) -> Duration {
        ctx.property("validitySeconds")
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::seconds)
            .unwrap_or(self.settings.validity)
    }

    async fn send_code(&self, ctx: &ExecutorContext, recipient: String) -> Result<ExecutionResult, CoreError> {
        let length = self.code_length(ctx);
        let code = generate_code(length);
        let expires_at = Utc::now() + self.validity(ctx);

        self.sender
            .send_sms(&recipient, &format!("Your verification code is {}", code))
            .await?;
        info!(flow_id = %ctx.flow_id, node_id = %ctx.node_id, "Sent one-time passcode");

        Ok(ExecutionResult::user_input_required(vec![required_string("otp")])
            .with_runtime_data(DIGEST_KEY, code_digest(&ctx.flow_id, &code))
            .with_runtime_data(EXPIRES_AT_KEY, expires_at.to_rfc3339())
            .with_runtime_data(RECIPIENT_KEY, recipient.clone())
            .with_additional_data("otpLength", length.to_string())
            .with_additional_data("maskedRecipient", mask(&recipient)))
    }

    async fn verify(&self, ctx: &ExecutorContext, digest: &str) -> Result<ExecutionResult, CoreError> {
        let Some(otp) = ctx.input_str("otp").filter(|otp| !otp.is_empty()) else {
            return Ok(ExecutionResult::user_input_required(vec![required_string("otp")]));
        };

        let expired = ctx
            .runtime(EXPIRES_AT_KEY)
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map_or(true, |expires_at| Utc::now() >= expires_at);
        if expired {
            debug!(flow_id = %ctx.flow_id, "One-time passcode expired");
            return Ok(ExecutionResult::retry("The code has expired, submit again to receive a new one")
                .clear_runtime_data(DIGEST_KEY)
                .clear_runtime_data(EXPIRES_AT_KEY));
        }

        if code_digest(&ctx.flow_id, otp) != digest {
            debug!(flow_id = %ctx.flow_id, "One-time passcode mismatch");
            return Ok(ExecutionResult::retry("Invalid code"));
        }

        let recipient = ctx
            .runtime(RECIPIENT_KEY)
            .map(str::to_string)
            .or_else(|| lookup_string(ctx, "mobileNumber"))
            .unwrap_or_default();

        let verified = ExecutionResult::complete()
            .with_attribute("mobileNumber", Value::String(recipient.clone()))
            .with_attribute("mobileNumberVerified", Value::Bool(true))
            .clear_runtime_data(DIGEST_KEY)
            .clear_runtime_data(EXPIRES_AT_KEY)
            .clear_runtime_data(RECIPIENT_KEY);

        if ctx.property("resolveUser") == Some("false") {
            return Ok(route(verified, ctx, "onSuccess"));
        }

        match self.users.find_by_attribute("mobileNumber", &recipient).await? {
            Some(record) => Ok(route(verified.with_user(record.into()), ctx, "onSuccess")),
            None if ctx.flow_type == FlowType::Registration => Ok(route(verified, ctx, "onSuccess")),
            None => Ok(ExecutionResult::failure(format!(
                "no account is registered for {}",
                mask(&recipient)
            ))),
        }
    }
}

impl ExecutorBase for SmsOtpExecutor {
    fn name(&self) -> &str {
        Self::NAME
    }
}

#[async_trait]
impl Executor for SmsOtpExecutor {
    async fn execute(&self, ctx: &ExecutorContext) -> Result<ExecutionResult, CoreError> {
        match ctx.runtime(DIGEST_KEY) {
            Some(digest) => self.verify(ctx, digest).await,
            None => match lookup_string(ctx, "mobileNumber") {
                Some(recipient) => self.send_code(ctx, recipient).await,
                None => Ok(ExecutionResult::user_input_required(vec![required_string(
                    "mobileNumber",
                )])),
            },
        }
    }
}

fn generate_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Digest bound to the flow so a code cannot be replayed elsewhere
pub(crate) fn code_digest(flow_id: &FlowId, code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(flow_id.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

fn mask(recipient: &str) -> String {
    let visible: String = recipient
        .chars()
        .rev()
        .take(2)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{}{}", "*".repeat(recipient.chars().count().saturating_sub(2)), visible)
}
