//! Minimal GeoJSON geometry model with geodesic area and containment tests.
//!
//! Only the geometry kinds the jobs consume are modelled. Coordinates are
//! `[longitude, latitude]` in degrees; extra ordinates such as altitude are
//! ignored.

#![expect(
    clippy::float_arithmetic,
    reason = "geodesic area and ray casting operate on floating-point coordinates"
)]

use serde_json::Value;
use thiserror::Error;

/// Earth radius in metres used for spherical area, matching WGS84's
/// semi-major axis.
pub const EARTH_RADIUS_METERS: f64 = 6_378_137.0;

/// Errors returned while decoding GeoJSON.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeometryError {
    /// The document is not valid JSON.
    #[error("invalid GeoJSON document: {0}")]
    InvalidJson(String),

    /// The object has no string `type` member.
    #[error("GeoJSON object is missing its type")]
    MissingType,

    /// A feature has no geometry.
    #[error("GeoJSON feature has no geometry")]
    MissingGeometry,

    /// The coordinates do not match the declared geometry kind.
    #[error("invalid coordinates for {kind}: {reason}")]
    InvalidCoordinates {
        /// Declared geometry kind.
        kind: String,
        /// Decoding failure detail.
        reason: String,
    },

    /// The geometry kind is not supported by the caller.
    #[error("unsupported GeoJSON type {found}, expected {expected}")]
    UnsupportedKind {
        /// Kind found in the document.
        found: String,
        /// Kinds the caller accepts.
        expected: String,
    },
}

impl GeometryError {
    /// Returns `true` when the input was well-formed but of the wrong shape.
    #[must_use]
    pub const fn is_unsupported_shape(&self) -> bool {
        matches!(self, Self::UnsupportedKind { .. })
    }
}

/// A `[longitude, latitude]` pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl Position {
    /// Creates a position.
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// A closed linear ring.
pub type Ring = Vec<Position>;

/// A polygon as an outer ring followed by its holes.
pub type PolygonRings = Vec<Ring>;

/// Supported GeoJSON geometry kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Single position.
    Point(Position),
    /// Unconnected positions.
    MultiPoint(Vec<Position>),
    /// Connected positions.
    LineString(Vec<Position>),
    /// Several line strings.
    MultiLineString(Vec<Vec<Position>>),
    /// Outer ring plus holes.
    Polygon(PolygonRings),
    /// Several polygons.
    MultiPolygon(Vec<PolygonRings>),
}

impl Geometry {
    /// Parses a GeoJSON document holding a geometry or a feature.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] for invalid JSON, a missing type, malformed
    /// coordinates, or a kind that is not a supported geometry.
    pub fn parse(document: &str) -> Result<Self, GeometryError> {
        let value: Value = serde_json::from_str(document)
            .map_err(|err| GeometryError::InvalidJson(err.to_string()))?;
        Self::from_value(&value)
    }

    /// Decodes a geometry, unwrapping a `Feature` if present.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] as described for [`Geometry::parse`].
    pub fn from_value(value: &Value) -> Result<Self, GeometryError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(GeometryError::MissingType)?;
        if kind == "Feature" {
            let geometry = value
                .get("geometry")
                .filter(|geometry| !geometry.is_null())
                .ok_or(GeometryError::MissingGeometry)?;
            return Self::from_value(geometry);
        }

        let coordinates = value.get("coordinates").unwrap_or(&Value::Null);
        match kind {
            "Point" => {
                let raw: Vec<f64> = decode(kind, coordinates)?;
                position(kind, &raw).map(Self::Point)
            }
            "MultiPoint" => positions(kind, coordinates).map(Self::MultiPoint),
            "LineString" => positions(kind, coordinates).map(Self::LineString),
            "MultiLineString" => {
                let raw: Vec<Vec<Vec<f64>>> = decode(kind, coordinates)?;
                raw.iter()
                    .map(|line| line.iter().map(|pair| position(kind, pair)).collect())
                    .collect::<Result<_, _>>()
                    .map(Self::MultiLineString)
            }
            "Polygon" => {
                let raw: Vec<Vec<Vec<f64>>> = decode(kind, coordinates)?;
                polygon(kind, &raw).map(Self::Polygon)
            }
            "MultiPolygon" => {
                let raw: Vec<Vec<Vec<Vec<f64>>>> = decode(kind, coordinates)?;
                raw.iter()
                    .map(|rings| polygon(kind, rings))
                    .collect::<Result<_, _>>()
                    .map(Self::MultiPolygon)
            }
            other => Err(GeometryError::UnsupportedKind {
                found: other.to_owned(),
                expected: "a GeoJSON geometry".to_owned(),
            }),
        }
    }

    /// Returns the GeoJSON type name.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::MultiPoint(_) => "MultiPoint",
            Self::LineString(_) => "LineString",
            Self::MultiLineString(_) => "MultiLineString",
            Self::Polygon(_) => "Polygon",
            Self::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Returns every position of the geometry.
    #[must_use]
    pub fn vertices(&self) -> Vec<Position> {
        match self {
            Self::Point(point) => vec![*point],
            Self::MultiPoint(points) | Self::LineString(points) => points.clone(),
            Self::MultiLineString(lines) => lines.iter().flatten().copied().collect(),
            Self::Polygon(rings) => rings.iter().flatten().copied().collect(),
            Self::MultiPolygon(polygons) => polygons.iter().flatten().flatten().copied().collect(),
        }
    }

    /// Returns every segment of the geometry's lines and rings.
    #[must_use]
    pub fn edges(&self) -> Vec<(Position, Position)> {
        let paths: Vec<&[Position]> = match self {
            Self::Point(_) | Self::MultiPoint(_) => Vec::new(),
            Self::LineString(points) => vec![points.as_slice()],
            Self::MultiLineString(lines) => lines.iter().map(Vec::as_slice).collect(),
            Self::Polygon(rings) => rings.iter().map(Vec::as_slice).collect(),
            Self::MultiPolygon(polygons) => {
                polygons.iter().flatten().map(Vec::as_slice).collect()
            }
        };
        paths.into_iter().flat_map(segments).collect()
    }

    /// Returns `true` when an areal geometry covers `point`. Non-areal
    /// geometries cover nothing.
    #[must_use]
    pub fn encloses(&self, point: Position) -> bool {
        match self {
            Self::Polygon(rings) => polygon_contains(rings, point),
            Self::MultiPolygon(polygons) => {
                polygons.iter().any(|rings| polygon_contains(rings, point))
            }
            _ => false,
        }
    }

    /// Returns the polygons of an areal geometry.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::UnsupportedKind`] for non-areal kinds.
    pub fn into_polygons(self) -> Result<Vec<PolygonRings>, GeometryError> {
        match self {
            Self::Polygon(rings) => Ok(vec![rings]),
            Self::MultiPolygon(polygons) => Ok(polygons),
            other => Err(GeometryError::UnsupportedKind {
                found: other.kind().to_owned(),
                expected: "Polygon or MultiPolygon".to_owned(),
            }),
        }
    }
}

fn decode<T>(kind: &str, coordinates: &Value) -> Result<T, GeometryError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_value(coordinates.clone()).map_err(|err| GeometryError::InvalidCoordinates {
        kind: kind.to_owned(),
        reason: err.to_string(),
    })
}

fn position(kind: &str, raw: &[f64]) -> Result<Position, GeometryError> {
    match raw {
        [lon, lat, ..] if lon.is_finite() && lat.is_finite() => Ok(Position::new(*lon, *lat)),
        _ => Err(GeometryError::InvalidCoordinates {
            kind: kind.to_owned(),
            reason: format!("expected [longitude, latitude], found {raw:?}"),
        }),
    }
}

fn positions(kind: &str, coordinates: &Value) -> Result<Vec<Position>, GeometryError> {
    let raw: Vec<Vec<f64>> = decode(kind, coordinates)?;
    raw.iter().map(|pair| position(kind, pair)).collect()
}

fn polygon(kind: &str, raw: &[Vec<Vec<f64>>]) -> Result<PolygonRings, GeometryError> {
    if raw.is_empty() {
        return Err(GeometryError::InvalidCoordinates {
            kind: kind.to_owned(),
            reason: "polygon has no rings".to_owned(),
        });
    }
    raw.iter()
        .map(|ring| {
            let decoded: Ring = ring
                .iter()
                .map(|pair| position(kind, pair))
                .collect::<Result<_, _>>()?;
            if decoded.len() < 4 {
                return Err(GeometryError::InvalidCoordinates {
                    kind: kind.to_owned(),
                    reason: format!("ring has {} positions, expected at least 4", decoded.len()),
                });
            }
            Ok(decoded)
        })
        .collect()
}

/// Returns the unsigned spherical area of a ring in square metres.
#[must_use]
pub fn ring_area(ring: &[Position]) -> f64 {
    if ring.len() <= 2 {
        return 0.0;
    }
    let lowers = ring.iter();
    let middles = ring.iter().cycle().skip(1);
    let uppers = ring.iter().cycle().skip(2);
    let total: f64 = lowers
        .zip(middles)
        .zip(uppers)
        .map(|((lower, middle), upper)| {
            (upper.lon.to_radians() - lower.lon.to_radians()) * middle.lat.to_radians().sin()
        })
        .sum();
    (total * EARTH_RADIUS_METERS * EARTH_RADIUS_METERS / 2.0).abs()
}

/// Returns the area of a polygon: its outer ring minus its holes.
#[must_use]
pub fn polygon_area(rings: &[Ring]) -> f64 {
    let mut iter = rings.iter();
    let Some(outer) = iter.next() else {
        return 0.0;
    };
    iter.fold(ring_area(outer), |area, hole| area - ring_area(hole))
}

/// Returns the summed area of several polygons.
#[must_use]
pub fn total_area(polygons: &[PolygonRings]) -> f64 {
    polygons.iter().map(|rings| polygon_area(rings)).sum()
}

/// Returns the consecutive segments of a path.
pub fn segments(path: &[Position]) -> impl Iterator<Item = (Position, Position)> + '_ {
    path.windows(2).filter_map(|pair| match pair {
        [start, end] => Some((*start, *end)),
        _ => None,
    })
}

fn orientation(origin: Position, towards: Position, point: Position) -> f64 {
    (towards.lon - origin.lon) * (point.lat - origin.lat)
        - (towards.lat - origin.lat) * (point.lon - origin.lon)
}

/// Returns `true` when two segments cross at a single interior point.
/// Touching endpoints and collinear overlaps do not count as crossings.
#[must_use]
pub fn segments_cross(first: (Position, Position), second: (Position, Position)) -> bool {
    let (a, b) = first;
    let (c, d) = second;
    let straddles = |p: f64, q: f64| (p > 0.0 && q < 0.0) || (p < 0.0 && q > 0.0);
    straddles(orientation(a, b, c), orientation(a, b, d))
        && straddles(orientation(c, d, a), orientation(c, d, b))
}

/// Ray-casting test for a position against a single ring.
fn ring_contains(ring: &[Position], point: Position) -> bool {
    let mut inside = false;
    let previous = ring.iter().cycle().skip(ring.len().saturating_sub(1));
    for (current, prior) in ring.iter().zip(previous) {
        let crosses = (current.lat > point.lat) != (prior.lat > point.lat);
        if crosses {
            let intersect_lon = (prior.lon - current.lon) * (point.lat - current.lat)
                / (prior.lat - current.lat)
                + current.lon;
            if point.lon < intersect_lon {
                inside = !inside;
            }
        }
    }
    inside
}

/// Returns `true` when the point lies inside the outer ring and outside
/// every hole.
#[must_use]
pub fn polygon_contains(rings: &[Ring], point: Position) -> bool {
    let mut iter = rings.iter();
    let Some(outer) = iter.next() else {
        return false;
    };
    ring_contains(outer, point) && !iter.any(|hole| ring_contains(hole, point))
}
