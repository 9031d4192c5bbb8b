//! Jobs executed for workflow tasks and the registry that dispatches them.
//!
//! Each task's `task_type` tag selects one [`Job`] through the
//! [`JobRegistry`]. Jobs receive the task, read its opaque payload, and
//! return a JSON value that the runner persists as the task's result.

mod area;
pub mod geometry;
mod job;
mod notification;
mod region;
mod registry;
mod report;

pub use area::{AREA_UNIT, AreaOutput, PolygonAreaJob};
pub use job::{Job, JobError, JobResult};
pub use notification::{DEFAULT_NOTIFICATION_DELAY, NotificationJob};
pub use region::{NO_REGION_MATCH, Region, RegionCatalog, RegionLookupJob};
pub use registry::{JobKind, JobRegistry, UnknownJobType};
pub use report::{DEFAULT_REPORT_SUMMARY_TEMPLATE, Report, ReportEntry, ReportJob};
