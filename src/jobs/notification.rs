//! Simulated notification job.

use super::{Job, JobResult};
use crate::workflow::domain::Task;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::info;

/// Default simulated delivery latency.
pub const DEFAULT_NOTIFICATION_DELAY: Duration = Duration::from_millis(500);

/// Pretends to notify the task's client after a fixed delay.
#[derive(Debug, Clone, Copy)]
pub struct NotificationJob {
    delay: Duration,
}

impl NotificationJob {
    /// Creates a notification job with the given simulated latency.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Returns the simulated latency.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for NotificationJob {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_DELAY)
    }
}

#[async_trait]
impl Job for NotificationJob {
    async fn run(&self, task: &Task) -> JobResult<Value> {
        info!(
            task_id = %task.id(),
            client_id = task.client_id().as_str(),
            "sending notification"
        );
        tokio::time::sleep(self.delay).await;
        info!(task_id = %task.id(), "notification sent");
        Ok(json!({ "notified": true, "taskId": task.id().to_string() }))
    }
}
