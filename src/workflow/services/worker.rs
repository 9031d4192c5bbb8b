//! In-process polling loop feeding queued tasks to the runner.

use super::{TaskRunError, TaskRunner};
use crate::workflow::{
    domain::TaskStatus,
    ports::{StoreResult, WorkflowStore},
};
use mockable::Clock;
use std::{future::Future, pin::pin, sync::Arc, time::Duration};
use tracing::{debug, error, info, warn};

/// Counts from one [`TaskWorker::run_pending`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerTick {
    /// Tasks handed to the runner.
    pub processed: usize,
    /// Tasks whose job failed.
    pub failed: usize,
}

/// Sequential worker that runs every queued task it finds.
///
/// Only one task runs at a time, which is what keeps the runner's
/// unclaimed status transitions safe.
pub struct TaskWorker<S, C>
where
    S: WorkflowStore,
    C: Clock + Send + Sync,
{
    runner: TaskRunner<S, C>,
    store: Arc<S>,
    poll_interval: Duration,
}

impl<S, C> TaskWorker<S, C>
where
    S: WorkflowStore,
    C: Clock + Send + Sync,
{
    /// Creates a worker polling `store` every `poll_interval` when idle.
    #[must_use]
    pub const fn new(
        runner: TaskRunner<S, C>,
        store: Arc<S>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            runner,
            store,
            poll_interval,
        }
    }

    /// Runs every task that is queued when the pass starts.
    ///
    /// Tasks unblocked during the pass are picked up by the next one. Job
    /// failures are logged and counted.
    ///
    /// # Errors
    ///
    /// Returns the first store failure, abandoning the rest of the pass.
    pub async fn run_pending(&self) -> StoreResult<WorkerTick> {
        let queued = self.store.list_tasks_by_status(TaskStatus::Queued).await?;
        let mut tick = WorkerTick::default();
        for task in queued {
            tick.processed += 1;
            match self.runner.run(task).await {
                Ok(_) => {}
                Err(TaskRunError::Job { task_id, source }) => {
                    tick.failed += 1;
                    warn!(%task_id, error = %source, "worker observed task failure");
                }
                Err(TaskRunError::Store(err)) => return Err(err),
            }
        }
        if tick.processed > 0 {
            debug!(processed = tick.processed, failed = tick.failed, "worker pass finished");
        }
        Ok(tick)
    }

    /// Polls until `shutdown` resolves.
    ///
    /// A pass that found work is followed immediately by another; an idle or
    /// failed pass waits for the poll interval first. Store failures are
    /// logged and retried on the next pass.
    pub async fn run_until(&self, shutdown: impl Future<Output = ()>) {
        let mut stop = pin!(shutdown);
        info!(poll_interval = ?self.poll_interval, "task worker started");
        loop {
            let busy = match self.run_pending().await {
                Ok(tick) => tick.processed > 0,
                Err(err) => {
                    error!(error = %err, "worker pass failed");
                    false
                }
            };
            let delay = if busy { Duration::ZERO } else { self.poll_interval };
            tokio::select! {
                biased;
                () = &mut stop => break,
                () = tokio::time::sleep(delay) => {}
            }
        }
        info!("task worker stopped");
    }
}
