//! Behaviour tests for dependency gating, dispatch, and aggregation.

mod workflow_execution_steps;

use rstest_bdd_macros::scenario;
use workflow_execution_steps::world::{WorkflowWorld, world};

#[scenario(
    path = "tests/features/workflow_execution.feature",
    name = "Completing a step unblocks its dependent report"
)]
#[tokio::test(flavor = "multi_thread")]
async fn completing_step_unblocks_report(world: WorkflowWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/workflow_execution.feature",
    name = "A dependency on an absent step never progresses"
)]
#[tokio::test(flavor = "multi_thread")]
async fn absent_dependency_keeps_waiting(world: WorkflowWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/workflow_execution.feature",
    name = "An unregistered task type fails the task and its workflow"
)]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_task_type_fails_workflow(world: WorkflowWorld) {
    let _ = world;
}
