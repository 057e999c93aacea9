use async_trait::async_trait;
use tracing::info;
use crate::services::{NotificationSender, ServiceError};

/// Sender that only logs deliveries. For development hosts without an SMS
/// gateway; the message body is logged at info level.
#[derive(Debug, Default, Clone)]
pub struct LoggingNotificationSender;

#[async_trait]
impl NotificationSender for LoggingNotificationSender {
    async fn send_sms(&self, recipient: &str, message: &str) -> Result<(), ServiceError> {
        info!(recipient = %recipient, message = %message, "SMS delivery");
        Ok(())
    }
}
