//! Shared world state for workflow execution BDD scenarios.

use std::sync::Arc;

use eyre::eyre;
use geoflow::{
    config::EngineConfig,
    jobs::{JobRegistry, RegionCatalog},
    workflow::{
        adapters::memory::InMemoryWorkflowStore,
        domain::{StepDefinition, StepNumber, Task, WorkflowId},
        ports::TaskRepository,
        services::{
            TaskRunError, TaskRunOutcome, TaskRunner, WorkflowCreationService,
            WorkflowQueryService,
        },
    },
};
use mockable::DefaultClock;
use rstest::fixture;

/// Runner type used by the BDD world.
pub type TestRunner = TaskRunner<InMemoryWorkflowStore, DefaultClock>;

/// Scenario world for workflow execution behaviour tests.
pub struct WorkflowWorld {
    pub store: Arc<InMemoryWorkflowStore>,
    pub creator: WorkflowCreationService<InMemoryWorkflowStore, DefaultClock>,
    pub runner: TestRunner,
    pub queries: WorkflowQueryService<InMemoryWorkflowStore>,
    pub payload: String,
    pub steps: Vec<StepDefinition>,
    pub workflow_id: Option<WorkflowId>,
    pub last_run: Option<Result<TaskRunOutcome, TaskRunError>>,
}

impl WorkflowWorld {
    /// Creates a world over an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryWorkflowStore::new());
        let clock = Arc::new(DefaultClock);
        let config = EngineConfig {
            notification_delay_ms: 0,
            ..EngineConfig::default()
        };
        let registry = JobRegistry::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            &config,
            RegionCatalog::default(),
        );
        Self {
            creator: WorkflowCreationService::new(Arc::clone(&store), Arc::clone(&clock)),
            runner: TaskRunner::new(Arc::clone(&store), clock, registry),
            queries: WorkflowQueryService::new(Arc::clone(&store)),
            store,
            payload: "{}".to_owned(),
            steps: Vec::new(),
            workflow_id: None,
            last_run: None,
        }
    }

    /// Returns the created workflow's identifier.
    pub fn workflow_id(&self) -> Result<WorkflowId, eyre::Report> {
        self.workflow_id
            .ok_or_else(|| eyre!("workflow has not been created in this scenario"))
    }

    /// Loads the current state of the task at `step`.
    pub fn task_at(&self, step: u32) -> Result<Task, eyre::Report> {
        let workflow_id = self.workflow_id()?;
        let number = StepNumber::new(step)?;
        run_async(self.store.find_task_by_step(workflow_id, number))?
            .ok_or_else(|| eyre!("no task at step {step}"))
    }
}

impl Default for WorkflowWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> WorkflowWorld {
    WorkflowWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
