//! Background removal of expired flow sessions

use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use turnstile_core::FlowSessionRepository;

/// Periodically deletes expired sessions. The task stops when the handle is
/// dropped or [`ExpirySweeper::stop`] is called.
pub struct ExpirySweeper {
    handle: JoinHandle<()>,
}

impl ExpirySweeper {
    /// Start sweeping `sessions` every `period`
    pub fn start(sessions: Arc<dyn FlowSessionRepository>, period: Duration) -> Self {
        info!(period_secs = period.as_secs(), "Starting session expiry sweeper");
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                match sessions.delete_expired(Utc::now()).await {
                    Ok(0) => {}
                    Ok(removed) => debug!(removed, "Removed expired flow sessions"),
                    Err(e) => error!(error = %e, "Session sweep failed"),
                }
            }
        });
        Self { handle }
    }

    /// Stop the background task
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
