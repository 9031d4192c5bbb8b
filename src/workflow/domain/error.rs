//! Error types for workflow domain validation and parsing.

use super::StepNumber;
use thiserror::Error;

/// Errors returned while constructing workflow domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowDomainError {
    /// The step number is zero or outside the persisted range.
    #[error("invalid step number {0}, expected a positive 32-bit integer")]
    InvalidStepNumber(u32),

    /// The client identifier is empty after trimming.
    #[error("client identifier must not be empty")]
    EmptyClientId,

    /// A workflow definition contains no steps.
    #[error("workflow definition must contain at least one step")]
    EmptyWorkflow,

    /// Two steps of the same workflow share a step number.
    #[error("duplicate step number {0} in workflow definition")]
    DuplicateStepNumber(StepNumber),

    /// A step declares itself as its own predecessor.
    #[error("step {0} cannot depend on itself")]
    SelfDependency(StepNumber),

    /// A workflow definition could not be decoded.
    #[error("invalid workflow definition: {0}")]
    InvalidDefinition(String),
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing workflow statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown workflow status: {0}")]
pub struct ParseWorkflowStatusError(pub String);
