//! Shared test helpers for in-memory integration tests.

use geoflow::workflow::{
    adapters::memory::InMemoryWorkflowStore,
    domain::{ClientId, NewTask, StepNumber, Task, TaskType, Workflow},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Provides a fresh in-memory store for each test.
#[fixture]
pub fn store() -> InMemoryWorkflowStore {
    InMemoryWorkflowStore::new()
}

/// Provides a clock for record creation.
#[fixture]
pub fn clock() -> DefaultClock {
    DefaultClock
}

/// Provides an unsaved workflow.
#[fixture]
pub fn workflow(clock: DefaultClock) -> Workflow {
    Workflow::new(ClientId::new("client-1").expect("valid client id"), &clock)
}

/// Builds a step number, panicking on invalid test input.
pub fn step(value: u32) -> StepNumber {
    StepNumber::new(value).expect("valid step number")
}

/// Builds a queued task for `workflow`.
pub fn task(
    workflow: &Workflow,
    number: u32,
    dependency: Option<u32>,
    task_type: &str,
    clock: &DefaultClock,
) -> Task {
    Task::new(
        NewTask {
            workflow_id: workflow.id(),
            client_id: workflow.client_id().clone(),
            step_number: step(number),
            dependency_step_number: dependency.map(step),
            task_type: TaskType::new(task_type),
            payload: "{}".to_owned(),
        },
        clock,
    )
}
