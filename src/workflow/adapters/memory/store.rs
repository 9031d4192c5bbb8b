//! In-memory store backing tasks, workflows, and results.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::workflow::{
    domain::{ResultId, StepNumber, Task, TaskId, TaskResult, TaskStatus, Workflow, WorkflowId},
    ports::{ResultRepository, StoreError, StoreResult, TaskRepository, WorkflowRepository},
};

/// Thread-safe in-memory workflow store.
///
/// Each call takes the lock once, so individual record writes are atomic
/// with respect to each other, matching the row-level atomicity the task
/// runner relies on.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    tasks: HashMap<TaskId, Task>,
    step_index: HashMap<(WorkflowId, StepNumber), TaskId>,
    workflows: HashMap<WorkflowId, Workflow>,
    results: HashMap<ResultId, TaskResult>,
}

impl InMemoryWorkflowStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, InMemoryStoreState>> {
        self.state
            .read()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, InMemoryStoreState>> {
        self.state
            .write()
            .map_err(|err| StoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

fn sorted_by_step(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by_key(|task| (task.step_number(), task.id()));
    tasks
}

#[async_trait]
impl TaskRepository for InMemoryWorkflowStore {
    async fn store_task(&self, task: &Task) -> StoreResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(StoreError::DuplicateTask(task.id()));
        }

        let step_key = (task.workflow_id(), task.step_number());
        if state.step_index.contains_key(&step_key) {
            return Err(StoreError::DuplicateStep {
                workflow_id: task.workflow_id(),
                step_number: task.step_number(),
            });
        }

        state.step_index.insert(step_key, task.id());
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> StoreResult<()> {
        let mut state = self.write()?;
        let slot = state
            .tasks
            .get_mut(&task.id())
            .ok_or(StoreError::TaskNotFound(task.id()))?;
        *slot = task.clone();
        Ok(())
    }

    async fn find_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn find_task_by_step(
        &self,
        workflow_id: WorkflowId,
        step_number: StepNumber,
    ) -> StoreResult<Option<Task>> {
        let state = self.read()?;
        Ok(state
            .step_index
            .get(&(workflow_id, step_number))
            .and_then(|task_id| state.tasks.get(task_id))
            .cloned())
    }

    async fn list_workflow_tasks(&self, workflow_id: WorkflowId) -> StoreResult<Vec<Task>> {
        let state = self.read()?;
        let tasks = state
            .tasks
            .values()
            .filter(|task| task.workflow_id() == workflow_id)
            .cloned()
            .collect();
        Ok(sorted_by_step(tasks))
    }

    async fn find_dependents(
        &self,
        workflow_id: WorkflowId,
        step_number: StepNumber,
        status: TaskStatus,
    ) -> StoreResult<Vec<Task>> {
        let state = self.read()?;
        let tasks = state
            .tasks
            .values()
            .filter(|task| {
                task.workflow_id() == workflow_id
                    && task.dependency_step_number() == Some(step_number)
                    && task.status() == status
            })
            .cloned()
            .collect();
        Ok(sorted_by_step(tasks))
    }

    async fn list_tasks_by_status(&self, status: TaskStatus) -> StoreResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.status() == status)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.created_at(), task.step_number(), task.id()));
        Ok(tasks)
    }

    async fn delete_task(&self, id: TaskId) -> StoreResult<()> {
        let mut state = self.write()?;
        let removed = state.tasks.remove(&id).ok_or(StoreError::TaskNotFound(id))?;
        state
            .step_index
            .remove(&(removed.workflow_id(), removed.step_number()));
        Ok(())
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryWorkflowStore {
    async fn store_workflow(&self, workflow: &Workflow) -> StoreResult<()> {
        let mut state = self.write()?;
        if state.workflows.contains_key(&workflow.id()) {
            return Err(StoreError::DuplicateWorkflow(workflow.id()));
        }
        state.workflows.insert(workflow.id(), workflow.clone());
        Ok(())
    }

    async fn update_workflow(&self, workflow: &Workflow) -> StoreResult<()> {
        let mut state = self.write()?;
        let slot = state
            .workflows
            .get_mut(&workflow.id())
            .ok_or(StoreError::WorkflowNotFound(workflow.id()))?;
        *slot = workflow.clone();
        Ok(())
    }

    async fn find_workflow(&self, id: WorkflowId) -> StoreResult<Option<Workflow>> {
        Ok(self.read()?.workflows.get(&id).cloned())
    }

    async fn delete_workflow(&self, id: WorkflowId) -> StoreResult<()> {
        let mut state = self.write()?;
        state
            .workflows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::WorkflowNotFound(id))
    }
}

#[async_trait]
impl ResultRepository for InMemoryWorkflowStore {
    async fn store_result(&self, result: &TaskResult) -> StoreResult<()> {
        let mut state = self.write()?;
        if state.results.contains_key(&result.id()) {
            return Err(StoreError::DuplicateResult(result.id()));
        }
        state.results.insert(result.id(), result.clone());
        Ok(())
    }

    async fn find_result(&self, id: ResultId) -> StoreResult<Option<TaskResult>> {
        Ok(self.read()?.results.get(&id).cloned())
    }

    async fn delete_result(&self, id: ResultId) -> StoreResult<()> {
        let mut state = self.write()?;
        state
            .results
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::ResultNotFound(id))
    }
}
