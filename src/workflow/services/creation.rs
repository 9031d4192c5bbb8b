//! Creation of workflows and their tasks from declarative definitions.

use crate::workflow::{
    domain::{ClientId, NewTask, Task, Workflow, WorkflowDefinition, WorkflowDomainError},
    ports::{StoreError, WorkflowStore},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors returned by [`WorkflowCreationService`].
#[derive(Debug, Error)]
pub enum WorkflowCreationError {
    /// The client identifier or definition is invalid.
    #[error(transparent)]
    Domain(#[from] WorkflowDomainError),
    /// Persisting the workflow or a task failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A newly persisted workflow and its queued tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedWorkflow {
    /// The in-progress workflow.
    pub workflow: Workflow,
    /// One queued task per definition step, in declaration order.
    pub tasks: Vec<Task>,
}

/// Persists workflows built from [`WorkflowDefinition`]s.
#[derive(Clone)]
pub struct WorkflowCreationService<S, C>
where
    S: WorkflowStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> WorkflowCreationService<S, C>
where
    S: WorkflowStore,
    C: Clock + Send + Sync,
{
    /// Creates a creation service over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Persists an in-progress workflow with one queued task per step.
    ///
    /// Each task receives its step's payload when the step declares one,
    /// otherwise the workflow-wide `payload`. Dependencies on steps absent
    /// from the definition are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowCreationError::Domain`] for a blank client
    /// identifier or an invalid definition, and
    /// [`WorkflowCreationError::Store`] when persistence fails.
    pub async fn create(
        &self,
        client_id: &str,
        payload: &str,
        definition: &WorkflowDefinition,
    ) -> Result<CreatedWorkflow, WorkflowCreationError> {
        let owner = ClientId::new(client_id)?;
        definition.validate()?;

        let workflow = Workflow::new(owner, &*self.clock);
        let tasks: Vec<Task> = definition
            .steps
            .iter()
            .map(|step| {
                Task::new(
                    NewTask {
                        workflow_id: workflow.id(),
                        client_id: workflow.client_id().clone(),
                        step_number: step.step_number,
                        dependency_step_number: step.depends_on,
                        task_type: step.task_type.clone(),
                        payload: step.payload.as_deref().unwrap_or(payload).to_owned(),
                    },
                    &*self.clock,
                )
            })
            .collect();

        self.store.store_workflow(&workflow).await?;
        for task in &tasks {
            self.store.store_task(task).await?;
        }

        info!(
            workflow_id = %workflow.id(),
            client_id = workflow.client_id().as_str(),
            name = definition.name.as_str(),
            task_count = tasks.len(),
            "created workflow"
        );
        Ok(CreatedWorkflow { workflow, tasks })
    }
}
