//! Task execution: dependency gate, job dispatch, persistence, unblocking,
//! and workflow aggregation.
//!
//! The runner performs no atomic claim before dispatch. Two concurrent
//! invocations for the same task can both pass the gate and both run the
//! job, so callers must guarantee at most one in-flight run per task. The
//! bundled [`super::TaskWorker`] does so by processing tasks sequentially;
//! a concurrent scheduler needs a conditional `Queued -> InProgress` update
//! in the store first.

use super::WorkflowAggregator;
use crate::jobs::{JobError, JobRegistry};
use crate::workflow::{
    domain::{ResultId, StepNumber, Task, TaskId, TaskResult, TaskStatus},
    ports::{StoreError, StoreResult, WorkflowStore},
};
use mockable::Clock;
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Progress marker recorded while a task's job runs.
pub const STARTING_PROGRESS: &str = "starting job...";

/// Errors returned by [`TaskRunner::run`].
#[derive(Debug, Error)]
pub enum TaskRunError {
    /// A store operation failed; task and workflow keep their last
    /// successfully written state.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The task's job failed or could not be dispatched. The task has been
    /// marked failed and its workflow recomputed.
    #[error("task {task_id} failed: {source}")]
    Job {
        /// Failed task.
        task_id: TaskId,
        /// Job failure.
        #[source]
        source: JobError,
    },
}

/// How a [`TaskRunner::run`] call left the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunOutcome {
    /// The predecessor step has not completed; no job ran.
    Waiting,
    /// The job succeeded.
    Completed {
        /// Stored output, absent when the job produced none.
        result_id: Option<ResultId>,
        /// Number of dependents moved from waiting to queued.
        unblocked: usize,
    },
}

/// Drives one task through its lifecycle.
#[derive(Clone)]
pub struct TaskRunner<S, C>
where
    S: WorkflowStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    registry: JobRegistry,
    aggregator: WorkflowAggregator<S, C>,
    job_timeout: Option<Duration>,
}

impl<S, C> TaskRunner<S, C>
where
    S: WorkflowStore,
    C: Clock + Send + Sync,
{
    /// Creates a runner without a job timeout.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>, registry: JobRegistry) -> Self {
        let aggregator = WorkflowAggregator::new(Arc::clone(&store), Arc::clone(&clock));
        Self {
            store,
            clock,
            registry,
            aggregator,
            job_timeout: None,
        }
    }

    /// Bounds each job execution; an overrunning job fails with
    /// [`JobError::TimedOut`].
    #[must_use]
    pub const fn with_job_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.job_timeout = timeout;
        self
    }

    /// Runs `task`.
    ///
    /// A task whose predecessor step is missing or not yet completed is
    /// marked waiting and left alone. Otherwise the task moves to in-progress,
    /// its job runs, and the outcome is persisted. Waiting dependents of a
    /// completed task are re-queued but not executed. The owning workflow is
    /// recomputed after every dispatched run, including failed ones.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRunError::Job`] after the task has been marked failed
    /// and [`TaskRunError::Store`] when persistence fails.
    pub async fn run(&self, mut task: Task) -> Result<TaskRunOutcome, TaskRunError> {
        if !self.dependency_met(&task).await? {
            if task.mark_waiting(&*self.clock) {
                self.store.update_task(&task).await?;
            }
            debug!(
                task_id = %task.id(),
                workflow_id = %task.workflow_id(),
                dependency = ?task.dependency_step_number().map(StepNumber::value),
                "task is waiting on its predecessor"
            );
            return Ok(TaskRunOutcome::Waiting);
        }

        task.start(STARTING_PROGRESS, &*self.clock);
        self.store.update_task(&task).await?;
        info!(
            task_id = %task.id(),
            workflow_id = %task.workflow_id(),
            task_type = task.task_type().as_str(),
            "starting task"
        );

        let settled = match self.execute(&task).await {
            Ok(output) => self.complete(&mut task, output).await.map_err(TaskRunError::from),
            Err(source) => self.fail(&mut task, source).await,
        };
        let aggregated = self.aggregator.recompute(task.workflow_id()).await;
        let outcome = settled?;
        aggregated?;
        Ok(outcome)
    }

    async fn dependency_met(&self, task: &Task) -> StoreResult<bool> {
        let Some(step) = task.dependency_step_number() else {
            return Ok(true);
        };
        let predecessor = self
            .store
            .find_task_by_step(task.workflow_id(), step)
            .await?;
        Ok(predecessor.is_some_and(|found| found.status() == TaskStatus::Completed))
    }

    async fn execute(&self, task: &Task) -> Result<Value, JobError> {
        let job = self.registry.resolve(task.task_type())?;
        match self.job_timeout {
            Some(limit) => tokio::time::timeout(limit, job.run(task))
                .await
                .map_err(|_| JobError::TimedOut(limit))?,
            None => job.run(task).await,
        }
    }

    async fn complete(&self, task: &mut Task, output: Value) -> StoreResult<TaskRunOutcome> {
        let result_id = if output.is_null() {
            None
        } else {
            let data = serde_json::to_string(&output).map_err(StoreError::persistence)?;
            let result = TaskResult::new(task.id(), data, &*self.clock);
            self.store.store_result(&result).await?;
            Some(result.id())
        };

        task.complete(result_id, &*self.clock);
        self.store.update_task(task).await?;

        let dependents = self
            .store
            .find_dependents(task.workflow_id(), task.step_number(), TaskStatus::Waiting)
            .await?;
        let unblocked = dependents.len();
        for mut dependent in dependents {
            dependent.unblock(&*self.clock);
            self.store.update_task(&dependent).await?;
        }

        info!(
            task_id = %task.id(),
            workflow_id = %task.workflow_id(),
            task_type = task.task_type().as_str(),
            unblocked,
            "task completed"
        );
        Ok(TaskRunOutcome::Completed {
            result_id,
            unblocked,
        })
    }

    async fn fail(
        &self,
        task: &mut Task,
        source: JobError,
    ) -> Result<TaskRunOutcome, TaskRunError> {
        task.fail(&*self.clock);
        self.store.update_task(task).await?;
        warn!(
            task_id = %task.id(),
            workflow_id = %task.workflow_id(),
            task_type = task.task_type().as_str(),
            error = %source,
            "task failed"
        );
        Err(TaskRunError::Job {
            task_id: task.id(),
            source,
        })
    }
}
