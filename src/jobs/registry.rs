//! Task-type dispatch.

use super::{
    Job, NotificationJob, PolygonAreaJob, RegionCatalog, RegionLookupJob, ReportJob,
};
use crate::{
    config::{ConfigError, EngineConfig},
    workflow::{domain::TaskType, ports::WorkflowStore},
};
use mockable::Clock;
use std::{fmt, sync::Arc};
use thiserror::Error;

/// Returned when a task type has no registered job.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no job found for task type: {0}")]
pub struct UnknownJobType(pub String);

/// Every job kind the engine can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    /// Geodesic polygon area.
    PolygonArea,
    /// Containing reference region lookup.
    RegionLookup,
    /// Simulated client notification.
    Notification,
    /// Workflow report assembly.
    Report,
}

impl JobKind {
    /// Every job kind.
    pub const ALL: [Self; 4] = [
        Self::PolygonArea,
        Self::RegionLookup,
        Self::Notification,
        Self::Report,
    ];

    /// Returns the task-type tag selecting this kind.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::PolygonArea => "polygonArea",
            Self::RegionLookup => "analysis",
            Self::Notification => "notification",
            Self::Report => "report",
        }
    }

    /// Resolves a task-type tag. Matching is exact and case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownJobType`] for any unregistered tag.
    pub fn from_tag(tag: &str) -> Result<Self, UnknownJobType> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| UnknownJobType(tag.to_owned()))
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Maps task types to job implementations.
///
/// The registry holds exactly one job per [`JobKind`], so every known tag
/// always resolves.
#[derive(Clone)]
pub struct JobRegistry {
    polygon_area: Arc<dyn Job>,
    region_lookup: Arc<dyn Job>,
    notification: Arc<dyn Job>,
    report: Arc<dyn Job>,
}

impl JobRegistry {
    /// Builds the standard registry.
    #[must_use]
    pub fn new<S, C>(
        store: Arc<S>,
        clock: Arc<C>,
        config: &EngineConfig,
        catalog: RegionCatalog,
    ) -> Self
    where
        S: WorkflowStore + 'static,
        C: Clock + Send + Sync + 'static,
    {
        Self {
            polygon_area: Arc::new(PolygonAreaJob),
            region_lookup: Arc::new(RegionLookupJob::new(Arc::new(catalog))),
            notification: Arc::new(NotificationJob::new(config.notification_delay())),
            report: Arc::new(ReportJob::new(
                store,
                clock,
                config.report_summary_template.clone(),
            )),
        }
    }

    /// Builds the standard registry, loading the region catalog named by
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the region catalog cannot be loaded.
    pub fn from_config<S, C>(
        store: Arc<S>,
        clock: Arc<C>,
        config: &EngineConfig,
    ) -> Result<Self, ConfigError>
    where
        S: WorkflowStore + 'static,
        C: Clock + Send + Sync + 'static,
    {
        let catalog = config.load_region_catalog()?;
        Ok(Self::new(store, clock, config, catalog))
    }

    /// Replaces the job registered for `kind`.
    #[must_use]
    pub fn with_job(mut self, kind: JobKind, job: Arc<dyn Job>) -> Self {
        *self.slot_mut(kind) = job;
        self
    }

    /// Returns the job registered for `kind`.
    #[must_use]
    pub fn job(&self, kind: JobKind) -> Arc<dyn Job> {
        let slot = match kind {
            JobKind::PolygonArea => &self.polygon_area,
            JobKind::RegionLookup => &self.region_lookup,
            JobKind::Notification => &self.notification,
            JobKind::Report => &self.report,
        };
        Arc::clone(slot)
    }

    /// Resolves the job for a task type.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownJobType`] when the tag is not registered.
    pub fn resolve(&self, task_type: &TaskType) -> Result<Arc<dyn Job>, UnknownJobType> {
        JobKind::from_tag(task_type.as_str()).map(|kind| self.job(kind))
    }

    const fn slot_mut(&mut self, kind: JobKind) -> &mut Arc<dyn Job> {
        match kind {
            JobKind::PolygonArea => &mut self.polygon_area,
            JobKind::RegionLookup => &mut self.region_lookup,
            JobKind::Notification => &mut self.notification,
            JobKind::Report => &mut self.report,
        }
    }
}

impl fmt::Debug for JobRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(JobKind::ALL.iter().map(|kind| kind.tag())).finish()
    }
}
