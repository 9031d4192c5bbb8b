//! Read-side queries over workflow status and results.

use crate::workflow::{
    domain::{TaskStatus, WorkflowId, WorkflowStatus},
    ports::{StoreError, WorkflowStore},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by [`WorkflowQueryService`].
#[derive(Debug, Error)]
pub enum WorkflowQueryError {
    /// No workflow has the requested identifier.
    #[error("workflow {0} not found")]
    NotFound(WorkflowId),

    /// Results were requested before the workflow completed.
    #[error("workflow {workflow_id} is not completed (status: {status})")]
    NotCompleted {
        /// Requested workflow.
        workflow_id: WorkflowId,
        /// Its current status.
        status: WorkflowStatus,
    },

    /// Any other store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Progress summary of one workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatusView {
    /// Workflow identifier.
    pub workflow_id: WorkflowId,
    /// Aggregate status.
    pub status: WorkflowStatus,
    /// Number of completed tasks.
    pub completed_tasks: usize,
    /// Total number of tasks.
    pub total_tasks: usize,
}

/// Consolidated output of a completed workflow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResultsView {
    /// Workflow identifier.
    pub workflow_id: WorkflowId,
    /// Aggregate status, always completed.
    pub status: WorkflowStatus,
    /// Parsed final result, or `null` if none was stored.
    pub final_result: Value,
}

/// Answers status and results queries.
#[derive(Clone)]
pub struct WorkflowQueryService<S>
where
    S: WorkflowStore,
{
    store: Arc<S>,
}

impl<S> WorkflowQueryService<S>
where
    S: WorkflowStore,
{
    /// Creates a query service over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the workflow's status with completed and total task counts.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowQueryError::NotFound`] for an unknown workflow.
    pub async fn status(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<WorkflowStatusView, WorkflowQueryError> {
        let workflow = self
            .store
            .find_workflow(workflow_id)
            .await?
            .ok_or(WorkflowQueryError::NotFound(workflow_id))?;
        let tasks = self.store.list_workflow_tasks(workflow_id).await?;
        let completed_tasks = tasks
            .iter()
            .filter(|task| task.status() == TaskStatus::Completed)
            .count();

        Ok(WorkflowStatusView {
            workflow_id,
            status: workflow.status(),
            completed_tasks,
            total_tasks: tasks.len(),
        })
    }

    /// Returns the parsed final result of a completed workflow.
    ///
    /// A stored final result that is not valid JSON is returned as a string.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowQueryError::NotFound`] for an unknown workflow and
    /// [`WorkflowQueryError::NotCompleted`] while the workflow is not
    /// completed.
    pub async fn results(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<WorkflowResultsView, WorkflowQueryError> {
        let workflow = self
            .store
            .find_workflow(workflow_id)
            .await?
            .ok_or(WorkflowQueryError::NotFound(workflow_id))?;

        match workflow.status() {
            WorkflowStatus::Completed => {}
            status @ (WorkflowStatus::InProgress | WorkflowStatus::Failed) => {
                return Err(WorkflowQueryError::NotCompleted {
                    workflow_id,
                    status,
                });
            }
        }

        let final_result = workflow.final_result().map_or(Value::Null, |raw| {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
        });
        Ok(WorkflowResultsView {
            workflow_id,
            status: workflow.status(),
            final_result,
        })
    }
}
