//! Unit tests for workflow execution.

mod support;
