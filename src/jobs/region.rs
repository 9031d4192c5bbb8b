//! Reference-region containment lookup job.

use super::{
    Job, JobResult,
    geometry::{
        Geometry, GeometryError, PolygonRings, Position, polygon_contains, segments,
        segments_cross,
    },
};
use crate::workflow::domain::Task;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Output returned when no catalog region contains the geometry. Every
/// lookup against an empty catalog returns it.
pub const NO_REGION_MATCH: &str = "No region found";

/// Named areal region used for containment lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    name: String,
    polygons: Vec<PolygonRings>,
}

impl Region {
    /// Creates a region from its polygons.
    #[must_use]
    pub fn new(name: impl Into<String>, polygons: Vec<PolygonRings>) -> Self {
        Self {
            name: name.into(),
            polygons,
        }
    }

    /// Returns the region name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` when `geometry` lies within the region.
    ///
    /// Vertices must be inside the region and no edge may cross its boundary.
    /// An areal geometry must also leave the region's holes outside.
    #[must_use]
    pub fn contains(&self, geometry: &Geometry) -> bool {
        let vertices = geometry.vertices();
        if vertices.is_empty() {
            return false;
        }
        let vertices_inside = vertices.iter().all(|vertex| {
            self.polygons
                .iter()
                .any(|rings| polygon_contains(rings, *vertex))
        });
        vertices_inside && !self.boundary_crossed_by(geometry) && !self.hole_enclosed_by(geometry)
    }

    fn boundary(&self) -> impl Iterator<Item = (Position, Position)> + '_ {
        self.polygons
            .iter()
            .flatten()
            .flat_map(|ring| segments(ring))
    }

    fn boundary_crossed_by(&self, geometry: &Geometry) -> bool {
        let edges = geometry.edges();
        self.boundary()
            .any(|border| edges.iter().any(|edge| segments_cross(*edge, border)))
    }

    fn hole_enclosed_by(&self, geometry: &Geometry) -> bool {
        self.polygons
            .iter()
            .flat_map(|rings| rings.iter().skip(1))
            .filter_map(|hole| hole.first())
            .any(|corner| geometry.encloses(*corner))
    }
}

/// Ordered collection of reference regions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionCatalog {
    regions: Vec<Region>,
}

impl RegionCatalog {
    /// Creates a catalog from regions, preserving their order.
    #[must_use]
    pub fn new(regions: impl IntoIterator<Item = Region>) -> Self {
        Self {
            regions: regions.into_iter().collect(),
        }
    }

    /// Decodes a GeoJSON `FeatureCollection` whose features carry a `name`
    /// property and an areal geometry.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] when the document is not a feature
    /// collection, a feature lacks a name, or a geometry is not areal.
    pub fn from_geojson(document: &str) -> Result<Self, GeometryError> {
        let value: Value = serde_json::from_str(document)
            .map_err(|err| GeometryError::InvalidJson(err.to_string()))?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(GeometryError::MissingType)?;
        if kind != "FeatureCollection" {
            return Err(GeometryError::UnsupportedKind {
                found: kind.to_owned(),
                expected: "FeatureCollection".to_owned(),
            });
        }

        let features = value
            .get("features")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let regions = features
            .iter()
            .map(|feature| {
                let name = feature
                    .pointer("/properties/name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| GeometryError::InvalidCoordinates {
                        kind: "Feature".to_owned(),
                        reason: "region feature has no name property".to_owned(),
                    })?;
                let polygons = Geometry::from_value(feature)?.into_polygons()?;
                Ok(Region::new(name, polygons))
            })
            .collect::<Result<Vec<_>, GeometryError>>()?;
        Ok(Self { regions })
    }

    /// Returns the number of regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns `true` when the catalog holds no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Returns the first region wholly containing `geometry`.
    #[must_use]
    pub fn locate(&self, geometry: &Geometry) -> Option<&Region> {
        self.regions.iter().find(|region| region.contains(geometry))
    }
}

/// Finds the reference region a feature falls within.
#[derive(Debug, Clone, Default)]
pub struct RegionLookupJob {
    catalog: Arc<RegionCatalog>,
}

impl RegionLookupJob {
    /// Creates a lookup job over a shared catalog.
    #[must_use]
    pub const fn new(catalog: Arc<RegionCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Job for RegionLookupJob {
    async fn run(&self, task: &Task) -> JobResult<Value> {
        let geometry = Geometry::parse(task.payload())?;
        let region = self
            .catalog
            .locate(&geometry)
            .map_or(NO_REGION_MATCH, Region::name);
        debug!(task_id = %task.id(), region, "resolved containing region");
        Ok(Value::String(region.to_owned()))
    }
}
