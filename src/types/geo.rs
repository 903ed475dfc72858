//! Geographic primitives used to describe what the user selected on the map:
//! clicked points and drawn polygons, plus the longitude conventions needed to
//! talk to the EDR backend (which indexes longitudes on 0..360).

use crate::query::error::QueryError;
use serde_json::Value;
use std::fmt;

/// Maps any longitude onto the backend's `[0, 360)` convention.
///
/// Equivalent to `(lng + 360) mod 360` for the map's `[-180, 180)` range, and
/// still lands in `[0, 360)` for clicks on wrapped world copies.
///
/// ```
/// use flux_demos::normalize_lng;
///
/// assert_eq!(normalize_lng(-74.5), 285.5);
/// assert_eq!(normalize_lng(10.0), 10.0);
/// assert_eq!(normalize_lng(-180.0), 180.0);
/// ```
pub fn normalize_lng(lng: f64) -> f64 {
    let wrapped = (lng + 360.0).rem_euclid(360.0);
    // rem_euclid can round up to the modulus for values just below zero
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Shifts `lng` by whole turns until it lies within 180° of `reference`.
///
/// Used so a popup anchors on the copy of a feature closest to the cursor when
/// the map shows several copies of the world.
pub fn wrap_near(lng: f64, reference: f64) -> f64 {
    let mut lng = lng;
    while (reference - lng).abs() > 180.0 {
        lng += if reference > lng { 360.0 } else { -360.0 };
    }
    lng
}

/// A longitude/latitude pair in degrees, in map order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    /// Creates a point, rejecting non-finite values and latitudes outside `[-90, 90]`.
    ///
    /// Longitudes are not range checked: the map reports clicks on wrapped copies
    /// of the world with longitudes beyond ±180, and [`normalize_lng`] handles them.
    pub fn new(lng: f64, lat: f64) -> Result<Self, QueryError> {
        if !lng.is_finite() || !lat.is_finite() {
            return Err(QueryError::InvalidCoordinate { lng, lat });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(QueryError::InvalidCoordinate { lng, lat });
        }
        Ok(Self { lng, lat })
    }

    /// Longitude on the backend's 0..360 convention.
    pub fn backend_lng(&self) -> f64 {
        normalize_lng(self.lng)
    }

    /// `"lon lat"` with the longitude normalized, as used inside WKT.
    pub(crate) fn wkt_pair(&self, separator: &str) -> String {
        format!("{}{}{}", self.backend_lng(), separator, self.lat)
    }

    /// Parses a GeoJSON position (`[lng, lat, ...]`).
    pub fn from_position(value: &Value) -> Result<Self, QueryError> {
        let coords = value.as_array().ok_or(QueryError::MalformedGeometry(
            "position is not an array".to_string(),
        ))?;
        match (
            coords.first().and_then(Value::as_f64),
            coords.get(1).and_then(Value::as_f64),
        ) {
            (Some(lng), Some(lat)) => Self::new(lng, lat),
            _ => Err(QueryError::MalformedGeometry(format!(
                "position needs two numbers, got {}",
                value
            ))),
        }
    }
}

impl fmt::Display for LngLat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}°, {:.3}°", self.lng, self.lat)
    }
}

/// A drawn area: an ordered ring of at least three points.
///
/// The ring is kept exactly as drawn. A closing point is neither added nor
/// stripped, so a ring coming from a draw control (which repeats the first
/// point) serializes with the repeat and a hand-built ring serializes without.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    ring: Vec<LngLat>,
}

impl Polygon {
    pub const MIN_POINTS: usize = 3;

    pub fn new(ring: Vec<LngLat>) -> Result<Self, QueryError> {
        if ring.len() < Self::MIN_POINTS {
            return Err(QueryError::DegeneratePolygon {
                points: ring.len(),
            });
        }
        Ok(Self { ring })
    }

    /// Builds a polygon from a GeoJSON `Polygon` geometry, using its outer ring.
    ///
    /// Accepts either the geometry object itself or a feature wrapping it.
    pub fn from_geojson(value: &Value) -> Result<Self, QueryError> {
        let geometry = value.get("geometry").unwrap_or(value);
        match geometry.get("type").and_then(Value::as_str) {
            Some("Polygon") => {}
            other => {
                return Err(QueryError::MalformedGeometry(format!(
                    "expected a Polygon geometry, got {:?}",
                    other
                )))
            }
        }
        let outer = geometry
            .get("coordinates")
            .and_then(|c| c.get(0))
            .and_then(Value::as_array)
            .ok_or(QueryError::MalformedGeometry(
                "polygon has no outer ring".to_string(),
            ))?;
        let ring = outer
            .iter()
            .map(LngLat::from_position)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(ring)
    }

    pub fn points(&self) -> &[LngLat] {
        &self.ring
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

/// What a query is about.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(LngLat),
    Polygon(Polygon),
}

impl Geometry {
    /// Serializes to WKT for the `coords` query parameter.
    ///
    /// Point coordinates are separated by `%20` since the string is embedded
    /// as-is in a URL; polygon pairs use a literal space, which the backend
    /// accepts inside the ring.
    pub fn to_wkt(&self) -> String {
        match self {
            Geometry::Point(point) => format!("POINT({})", point.wkt_pair("%20")),
            Geometry::Polygon(polygon) => {
                let pairs: Vec<String> = polygon
                    .points()
                    .iter()
                    .map(|point| point.wkt_pair(" "))
                    .collect();
                format!("POLYGON(({}))", pairs.join(","))
            }
        }
    }
}

impl From<LngLat> for Geometry {
    fn from(point: LngLat) -> Self {
        Geometry::Point(point)
    }
}

impl From<Polygon> for Geometry {
    fn from(polygon: Polygon) -> Self {
        Geometry::Polygon(polygon)
    }
}
