//! Port contracts for workflow execution.
//!
//! Ports define infrastructure-agnostic interfaces used by workflow services.

pub mod repository;

pub use repository::{
    ResultRepository, StoreError, StoreResult, TaskRepository, WorkflowRepository, WorkflowStore,
};
