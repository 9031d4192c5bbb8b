//! Workflow status and final-result aggregation.

use crate::workflow::{
    domain::{Task, WorkflowId, WorkflowOutcome, WorkflowStatus},
    ports::{StoreError, StoreResult, WorkflowStore},
};
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Recomputes a workflow's status from the live set of its tasks.
#[derive(Clone)]
pub struct WorkflowAggregator<S, C>
where
    S: WorkflowStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> WorkflowAggregator<S, C>
where
    S: WorkflowStore,
    C: Clock + Send + Sync,
{
    /// Creates an aggregator over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Re-evaluates and persists the workflow's status.
    ///
    /// The workflow is written on every call, whether or not anything
    /// changed. Repeated calls over an unchanged task set store identical
    /// status and final result. Returns `None` when the workflow does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when a lookup or the workflow write fails.
    pub async fn recompute(&self, workflow_id: WorkflowId) -> StoreResult<Option<WorkflowStatus>> {
        let Some(mut workflow) = self.store.find_workflow(workflow_id).await? else {
            debug!(%workflow_id, "skipping aggregation for unknown workflow");
            return Ok(None);
        };

        let tasks = self.store.list_workflow_tasks(workflow_id).await?;
        let outcome = match WorkflowStatus::aggregate(tasks.iter().map(Task::status)) {
            WorkflowStatus::Failed => WorkflowOutcome::Failed,
            WorkflowStatus::InProgress => WorkflowOutcome::InProgress,
            WorkflowStatus::Completed => WorkflowOutcome::Completed {
                final_result: self.final_result(&tasks).await?,
            },
        };

        workflow.apply(outcome, &*self.clock);
        self.store.update_workflow(&workflow).await?;
        debug!(
            %workflow_id,
            status = %workflow.status(),
            task_count = tasks.len(),
            "recomputed workflow status"
        );
        Ok(Some(workflow.status()))
    }

    /// Collects the parsed outputs of every task holding a result, in step
    /// order, as one serialized JSON array.
    async fn final_result(&self, tasks: &[Task]) -> StoreResult<String> {
        let mut outputs = Vec::with_capacity(tasks.len());
        for task in tasks {
            let Some(result_id) = task.result_id() else {
                continue;
            };
            match self.store.find_result(result_id).await? {
                Some(result) => outputs.push(result.parsed_data()),
                None => warn!(
                    task_id = %task.id(),
                    %result_id,
                    "task references a missing result; omitting it from the final result"
                ),
            }
        }
        serde_json::to_string(&Value::Array(outputs)).map_err(StoreError::persistence)
    }
}
