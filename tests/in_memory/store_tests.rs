//! Record storage, uniqueness, and ordering tests for the in-memory store.

use super::helpers::{clock, step, store, task, workflow};
use geoflow::workflow::{
    adapters::memory::InMemoryWorkflowStore,
    domain::{TaskResult, TaskStatus, Workflow},
    ports::{ResultRepository, StoreError, TaskRepository, WorkflowRepository},
};
use mockable::DefaultClock;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_step_in_workflow_is_rejected(
    store: InMemoryWorkflowStore,
    clock: DefaultClock,
    workflow: Workflow,
) -> Result<(), eyre::Report> {
    store.store_task(&task(&workflow, 1, None, "polygonArea", &clock)).await?;

    let err = store
        .store_task(&task(&workflow, 1, None, "report", &clock))
        .await
        .expect_err("step 1 is taken");

    assert!(matches!(
        err,
        StoreError::DuplicateStep { workflow_id, step_number }
            if workflow_id == workflow.id() && step_number == step(1)
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn same_step_in_different_workflows_is_allowed(
    store: InMemoryWorkflowStore,
    clock: DefaultClock,
    workflow: Workflow,
) -> Result<(), eyre::Report> {
    let other = Workflow::new(workflow.client_id().clone(), &clock);

    store.store_task(&task(&workflow, 1, None, "report", &clock)).await?;
    store.store_task(&task(&other, 1, None, "report", &clock)).await?;

    assert_eq!(store.list_workflow_tasks(workflow.id()).await?.len(), 1);
    assert_eq!(store.list_workflow_tasks(other.id()).await?.len(), 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn workflow_tasks_are_listed_by_step(
    store: InMemoryWorkflowStore,
    clock: DefaultClock,
    workflow: Workflow,
) -> Result<(), eyre::Report> {
    for number in [3, 1, 2] {
        store.store_task(&task(&workflow, number, None, "report", &clock)).await?;
    }

    let steps: Vec<u32> = store
        .list_workflow_tasks(workflow.id())
        .await?
        .iter()
        .map(|stored| stored.step_number().value())
        .collect();

    assert_eq!(steps, vec![1, 2, 3]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dependents_are_filtered_by_predecessor_and_status(
    store: InMemoryWorkflowStore,
    clock: DefaultClock,
    workflow: Workflow,
) -> Result<(), eyre::Report> {
    let mut waiting = task(&workflow, 2, Some(1), "report", &clock);
    waiting.mark_waiting(&clock);
    let queued = task(&workflow, 3, Some(1), "report", &clock);
    let mut other_parent = task(&workflow, 4, Some(2), "report", &clock);
    other_parent.mark_waiting(&clock);
    for record in [&waiting, &queued, &other_parent] {
        store.store_task(record).await?;
    }

    let dependents = store
        .find_dependents(workflow.id(), step(1), TaskStatus::Waiting)
        .await?;

    assert_eq!(dependents, vec![waiting]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_of_unknown_records_is_not_found(
    store: InMemoryWorkflowStore,
    clock: DefaultClock,
    workflow: Workflow,
) {
    let orphan = task(&workflow, 1, None, "report", &clock);

    let task_err = store.update_task(&orphan).await.expect_err("task was never stored");
    let workflow_err = store
        .update_workflow(&workflow)
        .await
        .expect_err("workflow was never stored");

    assert!(matches!(task_err, StoreError::TaskNotFound(id) if id == orphan.id()));
    assert!(matches!(workflow_err, StoreError::WorkflowNotFound(id) if id == workflow.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_task_frees_its_step(
    store: InMemoryWorkflowStore,
    clock: DefaultClock,
    workflow: Workflow,
) -> Result<(), eyre::Report> {
    let first = task(&workflow, 1, None, "report", &clock);
    store.store_task(&first).await?;
    store.delete_task(first.id()).await?;

    store.store_task(&task(&workflow, 1, None, "analysis", &clock)).await?;

    let found = store.find_task_by_step(workflow.id(), step(1)).await?;
    assert_eq!(
        found.map(|stored| stored.task_type().as_str().to_owned()),
        Some("analysis".to_owned())
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn results_round_trip_and_reject_duplicates(
    store: InMemoryWorkflowStore,
    clock: DefaultClock,
    workflow: Workflow,
) -> Result<(), eyre::Report> {
    let owner = task(&workflow, 1, None, "polygonArea", &clock);
    let result = TaskResult::new(owner.id(), r#"{"area":2}"#, &clock);
    store.store_result(&result).await?;

    let err = store.store_result(&result).await.expect_err("same id twice");

    assert_eq!(store.find_result(result.id()).await?, Some(result.clone()));
    assert!(matches!(err, StoreError::DuplicateResult(id) if id == result.id()));
    store.delete_result(result.id()).await?;
    assert_eq!(store.find_result(result.id()).await?, None);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn queued_tasks_are_listed_across_workflows(
    store: InMemoryWorkflowStore,
    clock: DefaultClock,
    workflow: Workflow,
) -> Result<(), eyre::Report> {
    let other = Workflow::new(workflow.client_id().clone(), &clock);
    let mut done = task(&workflow, 1, None, "report", &clock);
    done.complete(None, &clock);
    let pending = task(&workflow, 2, None, "report", &clock);
    let elsewhere = task(&other, 1, None, "report", &clock);
    for record in [&done, &pending, &elsewhere] {
        store.store_task(record).await?;
    }

    let queued = store.list_tasks_by_status(TaskStatus::Queued).await?;

    assert_eq!(queued.len(), 2);
    assert!(queued.contains(&pending));
    assert!(queued.contains(&elsewhere));
    Ok(())
}
