//! When steps for workflow execution BDD scenarios.

use super::world::{WorkflowWorld, run_async};
use rstest_bdd_macros::when;

fn run_step(world: &mut WorkflowWorld, step: u32) -> Result<(), eyre::Report> {
    let task = world.task_at(step)?;
    world.last_run = Some(run_async(world.runner.run(task)));
    Ok(())
}

#[when("step {step:u32} is run once")]
fn run_once(world: &mut WorkflowWorld, step: u32) -> Result<(), eyre::Report> {
    run_step(world, step)
}

#[when("step {step:u32} is run three times")]
fn run_three_times(world: &mut WorkflowWorld, step: u32) -> Result<(), eyre::Report> {
    for _ in 0..3 {
        run_step(world, step)?;
        if let Some(Err(err)) = &world.last_run {
            return Err(eyre::eyre!("waiting task must not error: {err}"));
        }
    }
    Ok(())
}
