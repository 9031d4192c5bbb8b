//! Geoflow: workflow task execution for geospatial processing jobs.
//!
//! A workflow is an ordered set of tasks, each bound to a job type and
//! optionally to a single predecessor step. This crate runs those tasks:
//! it gates each one on its predecessor, dispatches the job selected by the
//! task type, persists the outcome, re-queues dependents, and recomputes the
//! owning workflow's status and consolidated result.
//!
//! # Architecture
//!
//! Geoflow follows hexagonal architecture principles:
//!
//! - **Domain**: Tasks, workflows, results, and their status rules
//! - **Ports**: Abstract repository traits for persistence
//! - **Adapters**: In-memory and PostgreSQL implementations of the ports
//! - **Services**: Task runner, aggregator, queries, creation, and worker
//!
//! # Modules
//!
//! - [`workflow`]: Workflow execution core
//! - [`jobs`]: Job contract, registry, and the concrete geospatial jobs
//! - [`config`]: Engine configuration loading

pub mod config;
pub mod jobs;
pub mod workflow;
