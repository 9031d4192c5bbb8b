//! Task aggregate and task execution status.

use super::{ClientId, ParseTaskStatusError, ResultId, StepNumber, TaskId, TaskType, WorkflowId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution status of a single workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Eligible for pickup by the worker.
    Queued,
    /// Blocked on a predecessor step that has not completed.
    Waiting,
    /// The task's job is executing.
    InProgress,
    /// The job finished successfully.
    Completed,
    /// The job failed or could not be dispatched.
    Failed,
}

impl TaskStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Queued,
        Self::Waiting,
        Self::InProgress,
        Self::Completed,
        Self::Failed,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Waiting => "waiting",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Returns `true` for statuses a task never leaves on its own.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "queued" => Ok(Self::Queued),
            "waiting" => Ok(Self::Waiting),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a workflow, bound to a job type and an optional predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    workflow_id: WorkflowId,
    client_id: ClientId,
    step_number: StepNumber,
    dependency_step_number: Option<StepNumber>,
    task_type: TaskType,
    payload: String,
    status: TaskStatus,
    progress: Option<String>,
    result_id: Option<ResultId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for creating a new queued task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Owning workflow.
    pub workflow_id: WorkflowId,
    /// Tenant tag.
    pub client_id: ClientId,
    /// Position within the workflow.
    pub step_number: StepNumber,
    /// Predecessor step, if any.
    pub dependency_step_number: Option<StepNumber>,
    /// Job selector.
    pub task_type: TaskType,
    /// Opaque job input passed through to the job untouched.
    pub payload: String,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owning workflow.
    pub workflow_id: WorkflowId,
    /// Persisted tenant tag.
    pub client_id: ClientId,
    /// Persisted step number.
    pub step_number: StepNumber,
    /// Persisted predecessor step, if any.
    pub dependency_step_number: Option<StepNumber>,
    /// Persisted job selector.
    pub task_type: TaskType,
    /// Persisted job input.
    pub payload: String,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted progress marker.
    pub progress: Option<String>,
    /// Persisted result reference.
    pub result_id: Option<ResultId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a queued task.
    #[must_use]
    pub fn new(data: NewTask, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            workflow_id: data.workflow_id,
            client_id: data.client_id,
            step_number: data.step_number,
            dependency_step_number: data.dependency_step_number,
            task_type: data.task_type,
            payload: data.payload,
            status: TaskStatus::Queued,
            progress: None,
            result_id: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            workflow_id: data.workflow_id,
            client_id: data.client_id,
            step_number: data.step_number,
            dependency_step_number: data.dependency_step_number,
            task_type: data.task_type,
            payload: data.payload,
            status: data.status,
            progress: data.progress,
            result_id: data.result_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning workflow identifier.
    #[must_use]
    pub const fn workflow_id(&self) -> WorkflowId {
        self.workflow_id
    }

    /// Returns the tenant tag.
    #[must_use]
    pub const fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Returns the step number.
    #[must_use]
    pub const fn step_number(&self) -> StepNumber {
        self.step_number
    }

    /// Returns the predecessor step number, if any.
    #[must_use]
    pub const fn dependency_step_number(&self) -> Option<StepNumber> {
        self.dependency_step_number
    }

    /// Returns the job selector.
    #[must_use]
    pub const fn task_type(&self) -> &TaskType {
        &self.task_type
    }

    /// Returns the opaque job input.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Returns the execution status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the progress marker, set only while in progress.
    #[must_use]
    pub fn progress(&self) -> Option<&str> {
        self.progress.as_deref()
    }

    /// Returns the result reference, set only after a completion with output.
    #[must_use]
    pub const fn result_id(&self) -> Option<ResultId> {
        self.result_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Parks the task behind its unmet dependency.
    ///
    /// Returns `false` without touching the task when it is already waiting,
    /// so callers can skip the redundant write.
    pub fn mark_waiting(&mut self, clock: &impl Clock) -> bool {
        if self.status == TaskStatus::Waiting {
            return false;
        }
        self.status = TaskStatus::Waiting;
        self.touch(clock);
        true
    }

    /// Moves the task into execution with a progress marker.
    pub fn start(&mut self, progress: impl Into<String>, clock: &impl Clock) {
        self.status = TaskStatus::InProgress;
        self.progress = Some(progress.into());
        self.touch(clock);
    }

    /// Records a successful run and its optional output reference.
    pub fn complete(&mut self, result_id: Option<ResultId>, clock: &impl Clock) {
        self.status = TaskStatus::Completed;
        self.progress = None;
        self.result_id = result_id;
        self.touch(clock);
    }

    /// Records a failed run. Failed tasks never carry a result reference.
    pub fn fail(&mut self, clock: &impl Clock) {
        self.status = TaskStatus::Failed;
        self.progress = None;
        self.result_id = None;
        self.touch(clock);
    }

    /// Makes a waiting task eligible for pickup again.
    pub fn unblock(&mut self, clock: &impl Clock) {
        self.status = TaskStatus::Queued;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
