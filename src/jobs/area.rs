//! Geodesic polygon area job.

use super::{
    Job, JobResult,
    geometry::{Geometry, total_area},
};
use crate::workflow::domain::Task;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Unit tag attached to every area output.
pub const AREA_UNIT: &str = "square meters";

/// Output of [`PolygonAreaJob`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaOutput {
    /// Area in square metres.
    pub area: f64,
    /// Unit tag.
    pub unit: &'static str,
}

/// Computes the area of a Polygon or MultiPolygon payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonAreaJob;

impl PolygonAreaJob {
    /// Computes the area output for a raw GeoJSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`super::JobError::MalformedInput`] for undecodable payloads
    /// and [`super::JobError::UnsupportedInput`] for non-areal geometries.
    pub fn measure(payload: &str) -> JobResult<AreaOutput> {
        let polygons = Geometry::parse(payload)?.into_polygons()?;
        Ok(AreaOutput {
            area: total_area(&polygons),
            unit: AREA_UNIT,
        })
    }
}

#[async_trait]
impl Job for PolygonAreaJob {
    async fn run(&self, task: &Task) -> JobResult<Value> {
        let output = Self::measure(task.payload())?;
        debug!(task_id = %task.id(), area = output.area, "computed polygon area");
        serde_json::to_value(output).map_err(|err| super::JobError::Execution(err.to_string()))
    }
}
