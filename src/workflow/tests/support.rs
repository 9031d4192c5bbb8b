//! Shared fixtures for workflow service tests.

use std::sync::Arc;

use crate::{
    config::EngineConfig,
    jobs::{Job, JobKind, JobRegistry, JobResult, RegionCatalog},
    workflow::{
        adapters::memory::InMemoryWorkflowStore,
        domain::{StepDefinition, StepNumber, Task, TaskId, Workflow, WorkflowDefinition, WorkflowId},
        ports::{TaskRepository, WorkflowRepository},
        services::{CreatedWorkflow, TaskRunner, WorkflowCreationService},
    },
};
use async_trait::async_trait;
use mockable::DefaultClock;
use mockall::mock;
use rstest::fixture;
use serde_json::Value;

mock! {
    pub StubJob {}

    #[async_trait]
    impl Job for StubJob {
        async fn run(&self, task: &Task) -> JobResult<Value>;
    }
}

/// Runner type used throughout the service tests.
pub type TestRunner = TaskRunner<InMemoryWorkflowStore, DefaultClock>;

/// Store, clock, and helpers shared by a single test.
pub struct Harness {
    pub store: Arc<InMemoryWorkflowStore>,
    pub clock: Arc<DefaultClock>,
}

#[fixture]
pub fn harness() -> Harness {
    Harness {
        store: Arc::new(InMemoryWorkflowStore::new()),
        clock: Arc::new(DefaultClock),
    }
}

pub fn step(value: u32) -> StepNumber {
    StepNumber::new(value).expect("valid step number")
}

/// Returns a job that answers every call with `output`.
pub fn job_returning(output: Value) -> Arc<dyn Job> {
    let mut job = MockStubJob::new();
    job.expect_run().returning(move |_| Ok(output.clone()));
    Arc::new(job)
}

/// Returns a job that must never run.
pub fn job_never_called() -> Arc<dyn Job> {
    let mut job = MockStubJob::new();
    job.expect_run().never();
    Arc::new(job)
}

impl Harness {
    /// Standard registry with an empty region catalog.
    pub fn registry(&self) -> JobRegistry {
        JobRegistry::new(
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
            &EngineConfig::default(),
            RegionCatalog::default(),
        )
    }

    /// Standard registry with `job` substituted for `kind`.
    pub fn registry_with(&self, kind: JobKind, job: Arc<dyn Job>) -> JobRegistry {
        self.registry().with_job(kind, job)
    }

    pub fn runner(&self, registry: JobRegistry) -> TestRunner {
        TaskRunner::new(Arc::clone(&self.store), Arc::clone(&self.clock), registry)
    }

    /// Persists a workflow built from `steps` with a shared payload.
    pub async fn seed(&self, payload: &str, steps: Vec<StepDefinition>) -> CreatedWorkflow {
        WorkflowCreationService::new(Arc::clone(&self.store), Arc::clone(&self.clock))
            .create("client-1", payload, &WorkflowDefinition::new("test", steps))
            .await
            .expect("workflow seeding should succeed")
    }

    pub async fn task(&self, id: TaskId) -> Task {
        self.store
            .find_task(id)
            .await
            .expect("task lookup should succeed")
            .expect("task should exist")
    }

    pub async fn task_at(&self, workflow_id: WorkflowId, number: u32) -> Task {
        self.store
            .find_task_by_step(workflow_id, step(number))
            .await
            .expect("task lookup should succeed")
            .expect("step should exist")
    }

    pub async fn workflow(&self, id: WorkflowId) -> Workflow {
        self.store
            .find_workflow(id)
            .await
            .expect("workflow lookup should succeed")
            .expect("workflow should exist")
    }
}
