//! Repository ports for task, workflow, and result persistence.
//!
//! Method names carry their record kind so that a single adapter can
//! implement every port without ambiguous calls.

use crate::workflow::domain::{
    ResultId, StepNumber, Task, TaskId, TaskResult, TaskStatus, Workflow, WorkflowId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateTask`] when the task ID already exists
    /// or [`StoreError::DuplicateStep`] when the workflow already has a task
    /// with the same step number.
    async fn store_task(&self, task: &Task) -> StoreResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] when the task does not exist.
    async fn update_task(&self, task: &Task) -> StoreResult<()>;

    /// Finds a task by identifier.
    async fn find_task(&self, id: TaskId) -> StoreResult<Option<Task>>;

    /// Finds the task occupying `step_number` in a workflow.
    async fn find_task_by_step(
        &self,
        workflow_id: WorkflowId,
        step_number: StepNumber,
    ) -> StoreResult<Option<Task>>;

    /// Returns every task of a workflow ordered by ascending step number.
    async fn list_workflow_tasks(&self, workflow_id: WorkflowId) -> StoreResult<Vec<Task>>;

    /// Returns the tasks of a workflow that depend on `step_number` and
    /// currently have `status`, ordered by step number.
    async fn find_dependents(
        &self,
        workflow_id: WorkflowId,
        step_number: StepNumber,
        status: TaskStatus,
    ) -> StoreResult<Vec<Task>>;

    /// Returns all tasks with `status`, oldest first, then by step number.
    async fn list_tasks_by_status(&self, status: TaskStatus) -> StoreResult<Vec<Task>>;

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] when the task does not exist.
    async fn delete_task(&self, id: TaskId) -> StoreResult<()>;
}

/// Workflow persistence contract.
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Stores a new workflow.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateWorkflow`] when the ID already exists.
    async fn store_workflow(&self, workflow: &Workflow) -> StoreResult<()>;

    /// Persists changes to an existing workflow.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WorkflowNotFound`] when the workflow does not
    /// exist.
    async fn update_workflow(&self, workflow: &Workflow) -> StoreResult<()>;

    /// Finds a workflow by identifier.
    async fn find_workflow(&self, id: WorkflowId) -> StoreResult<Option<Workflow>>;

    /// Deletes a workflow record. Tasks are not cascaded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WorkflowNotFound`] when the workflow does not
    /// exist.
    async fn delete_workflow(&self, id: WorkflowId) -> StoreResult<()>;
}

/// Task result persistence contract.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Stores a new result.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateResult`] when the ID already exists.
    async fn store_result(&self, result: &TaskResult) -> StoreResult<()>;

    /// Finds a result by identifier.
    async fn find_result(&self, id: ResultId) -> StoreResult<Option<TaskResult>>;

    /// Deletes a result.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ResultNotFound`] when the result does not exist.
    async fn delete_result(&self, id: ResultId) -> StoreResult<()>;
}

/// A backend that persists every workflow record kind.
pub trait WorkflowStore: TaskRepository + WorkflowRepository + ResultRepository {}

impl<T> WorkflowStore for T where T: TaskRepository + WorkflowRepository + ResultRepository {}

/// Errors returned by store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The workflow already has a task at this step number.
    #[error("workflow {workflow_id} already has a task at step {step_number}")]
    DuplicateStep {
        /// Owning workflow.
        workflow_id: WorkflowId,
        /// Conflicting step number.
        step_number: StepNumber,
    },

    /// A workflow with the same identifier already exists.
    #[error("duplicate workflow identifier: {0}")]
    DuplicateWorkflow(WorkflowId),

    /// A result with the same identifier already exists.
    #[error("duplicate result identifier: {0}")]
    DuplicateResult(ResultId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The workflow was not found.
    #[error("workflow not found: {0}")]
    WorkflowNotFound(WorkflowId),

    /// The result was not found.
    #[error("result not found: {0}")]
    ResultNotFound(ResultId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
