//! Domain model for workflow execution.
//!
//! Tasks, workflows, and results reference each other only through explicit
//! identifier fields. Services fetch exactly the records a step needs through
//! the ports instead of navigating an object graph.

mod definition;
mod error;
mod ids;
mod result;
mod task;
mod workflow;

pub use definition::{StepDefinition, WorkflowDefinition};
pub use error::{ParseTaskStatusError, ParseWorkflowStatusError, WorkflowDomainError};
pub use ids::{ClientId, ResultId, StepNumber, TaskId, TaskType, WorkflowId};
pub use result::TaskResult;
pub use task::{NewTask, PersistedTaskData, Task, TaskStatus};
pub use workflow::{PersistedWorkflowData, Workflow, WorkflowOutcome, WorkflowStatus};
