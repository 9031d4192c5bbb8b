//! Diesel row models for workflow persistence.

use super::schema::{task_results, tasks, workflows};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result and insert row for workflow records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = workflows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorkflowRow {
    /// Workflow identifier.
    pub id: uuid::Uuid,
    /// Tenant tag.
    pub client_id: String,
    /// Aggregate status.
    pub status: String,
    /// Serialized final result.
    pub final_result: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Mutable workflow columns written by the aggregator.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = workflows)]
#[diesel(treat_none_as_null = true)]
pub struct WorkflowChangeset {
    /// Aggregate status.
    pub status: String,
    /// Serialized final result.
    pub final_result: Option<String>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result and insert row for task records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owning workflow.
    pub workflow_id: uuid::Uuid,
    /// Tenant tag.
    pub client_id: String,
    /// Step position.
    pub step_number: i32,
    /// Predecessor step.
    pub dependency_step_number: Option<i32>,
    /// Job selector.
    pub task_type: String,
    /// Opaque job input.
    pub payload: String,
    /// Execution status.
    pub status: String,
    /// Progress marker.
    pub progress: Option<String>,
    /// Result reference.
    pub result_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Mutable task columns written by the task runner.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    /// Execution status.
    pub status: String,
    /// Progress marker.
    pub progress: Option<String>,
    /// Result reference.
    pub result_id: Option<uuid::Uuid>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result and insert row for task results.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = task_results)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskResultRow {
    /// Result identifier.
    pub id: uuid::Uuid,
    /// Owning task.
    pub task_id: uuid::Uuid,
    /// Serialized output.
    pub data: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
