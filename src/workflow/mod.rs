//! Workflow execution for Geoflow.
//!
//! Tasks move through `Queued`, `Waiting`, `InProgress`, and a terminal
//! `Completed` or `Failed` state. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
