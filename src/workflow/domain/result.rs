//! Persisted output of a completed task.

use super::{ResultId, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Output row written once per successful task run that produced data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    id: ResultId,
    task_id: TaskId,
    data: String,
    created_at: DateTime<Utc>,
}

impl TaskResult {
    /// Creates a result holding already-serialized output.
    #[must_use]
    pub fn new(task_id: TaskId, data: impl Into<String>, clock: &impl Clock) -> Self {
        Self {
            id: ResultId::new(),
            task_id,
            data: data.into(),
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a result from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: ResultId,
        task_id: TaskId,
        data: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task_id,
            data,
            created_at,
        }
    }

    /// Returns the result identifier.
    #[must_use]
    pub const fn id(&self) -> ResultId {
        self.id
    }

    /// Returns the owning task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the serialized output.
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Parses the stored output as JSON, falling back to the raw text.
    #[must_use]
    pub fn parsed_data(&self) -> Value {
        serde_json::from_str(&self.data).unwrap_or_else(|_| Value::String(self.data.clone()))
    }
}
