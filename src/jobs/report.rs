//! Workflow report assembly job.

use super::{Job, JobError, JobResult};
use crate::workflow::{
    domain::{Task, TaskId, WorkflowId},
    ports::WorkflowStore,
};
use async_trait::async_trait;
use minijinja::{Environment, context};
use mockable::Clock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Summary template used when none is configured.
pub const DEFAULT_REPORT_SUMMARY_TEMPLATE: &str =
    "Report generated for workflow {{ workflow_id }} with {{ task_count }} tasks processed.";

/// Report document produced by [`ReportJob`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Workflow being reported on.
    pub workflow_id: WorkflowId,
    /// RFC 3339 generation timestamp.
    pub generated_at: String,
    /// Sibling task entries ordered by step number.
    pub tasks: Vec<ReportEntry>,
    /// Human-readable one-line summary.
    pub summary: String,
}

/// One sibling task in a [`Report`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    /// Sibling task identifier.
    pub task_id: TaskId,
    /// Sibling step number.
    pub step_number: u32,
    /// Sibling task type tag.
    #[serde(rename = "type")]
    pub task_type: String,
    /// Sibling status at report time.
    pub status: String,
    /// Sibling output, or `null` when it has none.
    pub output: Value,
}

/// Summarizes every other task of the reporting task's workflow.
pub struct ReportJob<S, C>
where
    S: WorkflowStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    summary_template: String,
}

impl<S, C> ReportJob<S, C>
where
    S: WorkflowStore,
    C: Clock + Send + Sync,
{
    /// Creates a report job reading from `store`.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>, summary_template: impl Into<String>) -> Self {
        Self {
            store,
            clock,
            summary_template: summary_template.into(),
        }
    }

    /// Assembles the report for `task`.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::MissingUpstream`] when the owning workflow is
    /// absent, [`JobError::Store`] for lookup failures, and
    /// [`JobError::Execution`] when the summary template cannot render.
    pub async fn assemble(&self, task: &Task) -> JobResult<Report> {
        let workflow_id = task.workflow_id();
        if self.store.find_workflow(workflow_id).await?.is_none() {
            return Err(JobError::MissingUpstream(format!(
                "workflow {workflow_id} not found"
            )));
        }

        let siblings = self.store.list_workflow_tasks(workflow_id).await?;
        let mut tasks = Vec::with_capacity(siblings.len());
        for sibling in siblings.iter().filter(|sibling| sibling.id() != task.id()) {
            tasks.push(self.entry(sibling).await?);
        }

        let summary = self.render_summary(workflow_id, tasks.len())?;
        Ok(Report {
            workflow_id,
            generated_at: self.clock.utc().to_rfc3339(),
            tasks,
            summary,
        })
    }

    async fn entry(&self, sibling: &Task) -> JobResult<ReportEntry> {
        let output = match sibling.result_id() {
            Some(result_id) => self
                .store
                .find_result(result_id)
                .await?
                .map_or(Value::Null, |result| result.parsed_data()),
            None => Value::Null,
        };
        Ok(ReportEntry {
            task_id: sibling.id(),
            step_number: sibling.step_number().value(),
            task_type: sibling.task_type().as_str().to_owned(),
            status: sibling.status().as_str().to_owned(),
            output,
        })
    }

    fn render_summary(&self, workflow_id: WorkflowId, task_count: usize) -> JobResult<String> {
        Environment::new()
            .render_str(
                &self.summary_template,
                context! { workflow_id => workflow_id.to_string(), task_count },
            )
            .map_err(|err| JobError::Execution(format!("report summary: {err}")))
    }
}

#[async_trait]
impl<S, C> Job for ReportJob<S, C>
where
    S: WorkflowStore,
    C: Clock + Send + Sync,
{
    async fn run(&self, task: &Task) -> JobResult<Value> {
        let report = self.assemble(task).await?;
        debug!(
            task_id = %task.id(),
            workflow_id = %report.workflow_id,
            entries = report.tasks.len(),
            "assembled workflow report"
        );
        serde_json::to_value(report).map_err(|err| JobError::Execution(err.to_string()))
    }
}
