//! Workflow aggregate and its status aggregation rule.

use super::{ClientId, ParseWorkflowStatusError, TaskStatus, WorkflowId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate status of a workflow, derived from its tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// At least one task has not reached a terminal state.
    InProgress,
    /// Every task completed.
    Completed,
    /// At least one task failed.
    Failed,
}

impl WorkflowStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Derives the workflow status from a snapshot of task statuses.
    ///
    /// Any failure wins over everything else; otherwise the workflow is
    /// completed only once every task is. A workflow without tasks is
    /// completed.
    #[must_use]
    pub fn aggregate(statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        let mut any_failed = false;
        let mut all_completed = true;
        for status in statuses {
            match status {
                TaskStatus::Failed => any_failed = true,
                TaskStatus::Completed => {}
                TaskStatus::Queued | TaskStatus::Waiting | TaskStatus::InProgress => {
                    all_completed = false;
                }
            }
        }

        match (any_failed, all_completed) {
            (true, _) => Self::Failed,
            (false, false) => Self::InProgress,
            (false, true) => Self::Completed,
        }
    }
}

impl TryFrom<&str> for WorkflowStatus {
    type Error = ParseWorkflowStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseWorkflowStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregation decision applied to a workflow record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// Some task failed; the final result is left as it was.
    Failed,
    /// Work remains; the final result is left as it was.
    InProgress,
    /// Every task completed; carries the serialized final result.
    Completed {
        /// Serialized collection of task outputs.
        final_result: String,
    },
}

/// Workflow aggregate owning an ordered set of tasks by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    id: WorkflowId,
    client_id: ClientId,
    status: WorkflowStatus,
    final_result: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedWorkflowData {
    /// Persisted workflow identifier.
    pub id: WorkflowId,
    /// Persisted tenant tag.
    pub client_id: ClientId,
    /// Persisted aggregate status.
    pub status: WorkflowStatus,
    /// Persisted final result blob.
    pub final_result: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Creates an in-progress workflow with no final result.
    #[must_use]
    pub fn new(client_id: ClientId, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: WorkflowId::new(),
            client_id,
            status: WorkflowStatus::InProgress,
            final_result: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a workflow from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedWorkflowData) -> Self {
        Self {
            id: data.id,
            client_id: data.client_id,
            status: data.status,
            final_result: data.final_result,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the workflow identifier.
    #[must_use]
    pub const fn id(&self) -> WorkflowId {
        self.id
    }

    /// Returns the tenant tag.
    #[must_use]
    pub const fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Returns the aggregate status.
    #[must_use]
    pub const fn status(&self) -> WorkflowStatus {
        self.status
    }

    /// Returns the serialized final result, if one has been computed.
    #[must_use]
    pub fn final_result(&self) -> Option<&str> {
        self.final_result.as_deref()
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

    /// Applies an aggregation decision.
    pub fn apply(&mut self, outcome: WorkflowOutcome, clock: &impl Clock) {
        match outcome {
            WorkflowOutcome::Failed => self.status = WorkflowStatus::Failed,
            WorkflowOutcome::InProgress => self.status = WorkflowStatus::InProgress,
            WorkflowOutcome::Completed { final_result } => {
                self.status = WorkflowStatus::Completed;
                self.final_result = Some(final_result);
            }
        }
        self.updated_at = clock.utc();
    }
}
