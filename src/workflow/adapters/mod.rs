//! Adapter implementations for workflow persistence ports.

pub mod memory;
pub mod postgres;
