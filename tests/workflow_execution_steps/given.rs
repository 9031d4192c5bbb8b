//! Given steps for workflow execution BDD scenarios.

use super::world::{WorkflowWorld, run_async};
use eyre::WrapErr;
use geoflow::workflow::domain::{StepDefinition, StepNumber, WorkflowDefinition};
use rstest_bdd_macros::given;

const RONDONIA_RING: &str = r#"{
    "type": "Feature",
    "geometry": {
        "type": "Polygon",
        "coordinates": [[
            [-63.624885020050996, -10.311050368263523],
            [-63.624885020050996, -10.367865108370523],
            [-63.61278302732815, -10.367865108370523],
            [-63.61278302732815, -10.311050368263523],
            [-63.624885020050996, -10.311050368263523]
        ]]
    }
}"#;

#[given("a workflow payload holding a closed polygon ring")]
fn polygon_payload(world: &mut WorkflowWorld) {
    RONDONIA_RING.clone_into(&mut world.payload);
}

#[given(r#"step {step:u32} runs the "{task_type}" job with no dependency"#)]
fn independent_step(
    world: &mut WorkflowWorld,
    step: u32,
    task_type: String,
) -> Result<(), eyre::Report> {
    let number = StepNumber::new(step).wrap_err("valid step number")?;
    world.steps.push(StepDefinition::new(task_type, number));
    Ok(())
}

#[given(r#"step {step:u32} runs the "{task_type}" job after step {dependency:u32}"#)]
fn dependent_step(
    world: &mut WorkflowWorld,
    step: u32,
    task_type: String,
    dependency: u32,
) -> Result<(), eyre::Report> {
    let number = StepNumber::new(step).wrap_err("valid step number")?;
    let predecessor = StepNumber::new(dependency).wrap_err("valid dependency step")?;
    world
        .steps
        .push(StepDefinition::new(task_type, number).depends_on(predecessor));
    Ok(())
}

#[given("the workflow has been created")]
fn workflow_created(world: &mut WorkflowWorld) -> Result<(), eyre::Report> {
    let definition = WorkflowDefinition::new("scenario", world.steps.clone());
    let created = run_async(world.creator.create("client-1", &world.payload, &definition))
        .wrap_err("create scenario workflow")?;
    world.workflow_id = Some(created.workflow.id());
    Ok(())
}
