//! Declarative workflow definitions used to create workflows and their tasks.

use super::{StepNumber, TaskType, WorkflowDomainError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One step of a workflow definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDefinition {
    /// Job selector for the step.
    pub task_type: TaskType,
    /// Position of the step within the workflow.
    pub step_number: StepNumber,
    /// Predecessor step, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<StepNumber>,
    /// Step-specific payload overriding the workflow-wide payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl StepDefinition {
    /// Creates a step without a predecessor.
    #[must_use]
    pub fn new(task_type: impl Into<String>, step_number: StepNumber) -> Self {
        Self {
            task_type: TaskType::new(task_type),
            step_number,
            depends_on: None,
            payload: None,
        }
    }

    /// Sets the predecessor step.
    #[must_use]
    pub const fn depends_on(mut self, step_number: StepNumber) -> Self {
        self.depends_on = Some(step_number);
        self
    }

    /// Sets a step-specific payload.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

/// Ordered list of steps making up a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    /// Human-readable workflow name.
    pub name: String,
    /// Steps in declaration order.
    pub steps: Vec<StepDefinition>,
}

impl WorkflowDefinition {
    /// Creates a definition from its steps.
    #[must_use]
    pub fn new(name: impl Into<String>, steps: impl IntoIterator<Item = StepDefinition>) -> Self {
        Self {
            name: name.into(),
            steps: steps.into_iter().collect(),
        }
    }

    /// Decodes a definition from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidDefinition`] when the document
    /// does not match the definition shape.
    pub fn from_json_str(document: &str) -> Result<Self, WorkflowDomainError> {
        serde_json::from_str(document)
            .map_err(|err| WorkflowDomainError::InvalidDefinition(err.to_string()))
    }

    /// Checks structural invariants of the definition.
    ///
    /// Dependencies on step numbers absent from the definition are accepted;
    /// such steps simply never become runnable.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError`] for an empty step list, duplicate step
    /// numbers, or a step that depends on itself.
    pub fn validate(&self) -> Result<(), WorkflowDomainError> {
        if self.steps.is_empty() {
            return Err(WorkflowDomainError::EmptyWorkflow);
        }

        let mut seen = HashSet::with_capacity(self.steps.len());
        for step in &self.steps {
            if !seen.insert(step.step_number) {
                return Err(WorkflowDomainError::DuplicateStepNumber(step.step_number));
            }
            if step.depends_on == Some(step.step_number) {
                return Err(WorkflowDomainError::SelfDependency(step.step_number));
            }
        }
        Ok(())
    }
}
