//! Then steps for workflow execution BDD scenarios.

use super::world::{WorkflowWorld, run_async};
use eyre::eyre;
use geoflow::{
    jobs::JobError,
    workflow::{
        domain::{TaskStatus, WorkflowStatus},
        ports::ResultRepository,
        services::TaskRunError,
    },
};
use rstest_bdd_macros::then;
use serde_json::Value;

#[then(r#"step {step:u32} is "{status}""#)]
fn step_has_status(world: &WorkflowWorld, step: u32, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())?;
    let task = world.task_at(step)?;
    if task.status() != expected {
        return Err(eyre!(
            "expected step {step} to be {expected}, found {}",
            task.status()
        ));
    }
    Ok(())
}

#[then("no result is stored for step {step:u32}")]
fn no_result_stored(world: &WorkflowWorld, step: u32) -> Result<(), eyre::Report> {
    let task = world.task_at(step)?;
    if let Some(result_id) = task.result_id() {
        return Err(eyre!("step {step} unexpectedly holds result {result_id}"));
    }
    Ok(())
}

#[then("the report of step {report:u32} lists only the output of step {source:u32}")]
fn report_lists_source_output(
    world: &WorkflowWorld,
    report: u32,
    source: u32,
) -> Result<(), eyre::Report> {
    let output_of = |step: u32| -> Result<Value, eyre::Report> {
        let result_id = world
            .task_at(step)?
            .result_id()
            .ok_or_else(|| eyre!("step {step} has no result"))?;
        let result = run_async(world.store.find_result(result_id))?
            .ok_or_else(|| eyre!("result {result_id} is missing"))?;
        Ok(result.parsed_data())
    };

    let report_output = output_of(report)?;
    let source_output = output_of(source)?;
    let entries = report_output
        .get("tasks")
        .and_then(Value::as_array)
        .ok_or_else(|| eyre!("report has no task list: {report_output}"))?;
    let [entry] = entries.as_slice() else {
        return Err(eyre!("expected one report entry, found {}", entries.len()));
    };
    if entry.get("stepNumber") != Some(&Value::from(source)) {
        return Err(eyre!("report entry is not step {source}: {entry}"));
    }
    if entry.get("output") != Some(&source_output) {
        return Err(eyre!("report entry output differs from step {source}: {entry}"));
    }
    if source_output.get("unit") != Some(&Value::from("square meters")) {
        return Err(eyre!("step {source} output is not an area: {source_output}"));
    }
    Ok(())
}

#[then(r#"the workflow is "{status}""#)]
fn workflow_has_status(world: &WorkflowWorld, status: String) -> Result<(), eyre::Report> {
    let expected = WorkflowStatus::try_from(status.as_str())?;
    let view = run_async(world.queries.status(world.workflow_id()?))?;
    if view.status != expected {
        return Err(eyre!(
            "expected workflow to be {expected}, found {}",
            view.status
        ));
    }
    Ok(())
}

#[then(r#"the run fails naming task type "{task_type}""#)]
fn run_fails_with_unknown_type(world: &WorkflowWorld, task_type: String) -> Result<(), eyre::Report> {
    match world.last_run.as_ref() {
        Some(Err(TaskRunError::Job {
            source: JobError::UnknownType(unknown),
            ..
        })) if unknown.0 == task_type => Ok(()),
        other => Err(eyre!("expected unknown task type failure, got {other:?}")),
    }
}
