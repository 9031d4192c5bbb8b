//! Services orchestrating workflow execution.

mod aggregator;
mod creation;
mod query;
mod runner;
mod worker;

pub use aggregator::WorkflowAggregator;
pub use creation::{CreatedWorkflow, WorkflowCreationError, WorkflowCreationService};
pub use query::{WorkflowQueryError, WorkflowQueryService, WorkflowResultsView, WorkflowStatusView};
pub use runner::{STARTING_PROGRESS, TaskRunError, TaskRunOutcome, TaskRunner};
pub use worker::{TaskWorker, WorkerTick};
