//! Job capability contract.

use super::{UnknownJobType, geometry::GeometryError};
use crate::workflow::{domain::Task, ports::StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Result type for job execution.
pub type JobResult<T> = Result<T, JobError>;

/// Domain work executed for one task.
///
/// One instance serves every task of its type, possibly concurrently, so
/// implementations keep no per-call mutable state.
#[async_trait]
pub trait Job: Send + Sync {
    /// Runs the job for `task`.
    ///
    /// Returns the output to persist, or [`Value::Null`] when the job
    /// produced nothing worth storing.
    ///
    /// # Errors
    ///
    /// Returns [`JobError`] describing why no output could be produced.
    async fn run(&self, task: &Task) -> JobResult<Value>;
}

/// Errors returned by jobs and by job dispatch.
#[derive(Debug, Error)]
pub enum JobError {
    /// The payload could not be decoded.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The payload decoded but has a shape the job cannot handle.
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// Records the job reads besides its own payload are absent.
    #[error("missing upstream data: {0}")]
    MissingUpstream(String),

    /// The task type has no registered job.
    #[error(transparent)]
    UnknownType(#[from] UnknownJobType),

    /// The job exceeded the configured execution timeout.
    #[error("job timed out after {0:?}")]
    TimedOut(Duration),

    /// A store lookup performed by the job failed.
    #[error("job store access failed: {0}")]
    Store(#[from] StoreError),

    /// Any other execution failure.
    #[error("job execution failed: {0}")]
    Execution(String),
}

impl From<GeometryError> for JobError {
    fn from(err: GeometryError) -> Self {
        if err.is_unsupported_shape() {
            Self::UnsupportedInput(err.to_string())
        } else {
            Self::MalformedInput(err.to_string())
        }
    }
}
