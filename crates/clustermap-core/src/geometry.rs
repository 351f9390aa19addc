//! Geographic coordinates, feature geometry and the Web-Mercator projection.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

/// Edge length of the projected world square at zoom 0, in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the Web-Mercator projection.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Geometry validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Polygon needs at least 3 vertices, got {count}")]
    TooFewVertices { count: usize },
    #[error("Coordinate is not finite: ({lat}, {lng})")]
    NonFiniteCoordinate { lat: f64, lng: f64 },
}

/// Result type for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    fn check_finite(self) -> GeometryResult<Self> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(GeometryError::NonFiniteCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }

    /// Project to world coordinates (zoom 0 pixels, origin top-left).
    ///
    /// Latitudes beyond the Mercator limit are clamped to it.
    pub fn project(&self) -> Point {
        let lat = self.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let sin_lat = lat.to_radians().sin();
        let x = TILE_SIZE * (0.5 + self.lng / 360.0);
        let y = TILE_SIZE * (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI));
        Point::new(x, y)
    }

    /// Inverse of [`LatLng::project`].
    pub fn unproject(world: Point) -> Self {
        let lng = (world.x / TILE_SIZE - 0.5) * 360.0;
        let mercator = PI * (1.0 - 2.0 * world.y / TILE_SIZE);
        let lat = mercator.sinh().atan().to_degrees();
        Self { lat, lng }
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

/// An axis-aligned lat/lng box. Does not handle antimeridian wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Bounds enclosing a single coordinate.
    pub fn from_coordinate(coordinate: LatLng) -> Self {
        Self::new(coordinate, coordinate)
    }

    /// Grow the bounds to include a coordinate.
    pub fn extend(&mut self, coordinate: LatLng) {
        self.south_west.lat = self.south_west.lat.min(coordinate.lat);
        self.south_west.lng = self.south_west.lng.min(coordinate.lng);
        self.north_east.lat = self.north_east.lat.max(coordinate.lat);
        self.north_east.lng = self.north_east.lng.max(coordinate.lng);
    }

    pub fn contains(&self, coordinate: LatLng) -> bool {
        coordinate.lat >= self.south_west.lat
            && coordinate.lat <= self.north_east.lat
            && coordinate.lng >= self.south_west.lng
            && coordinate.lng <= self.north_east.lng
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    /// The bounds as a rectangle in world coordinates.
    pub fn to_world_rect(&self) -> Rect {
        Rect::from_points(self.south_west.project(), self.north_east.project())
    }
}

/// Discriminant of a [`Geometry`], for counting and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    Polygon,
}

/// Geometry of a feature.
///
/// Polygon rings are stored open: the closing edge from the last vertex back
/// to the first is implied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Point { coordinate: LatLng },
    Polygon { ring: Vec<LatLng> },
}

impl Geometry {
    pub fn point(coordinate: LatLng) -> Self {
        Geometry::Point { coordinate }
    }

    /// Build a polygon, normalising and validating its ring.
    pub fn polygon(ring: Vec<LatLng>) -> GeometryResult<Self> {
        Geometry::Polygon { ring }.normalized()
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point { .. } => GeometryKind::Point,
            Geometry::Polygon { .. } => GeometryKind::Polygon,
        }
    }

    /// Validate the geometry and drop a repeated closing vertex from a ring.
    pub fn normalized(self) -> GeometryResult<Self> {
        match self {
            Geometry::Point { coordinate } => Ok(Geometry::Point {
                coordinate: coordinate.check_finite()?,
            }),
            Geometry::Polygon { mut ring } => {
                if ring.len() > 1 && ring.first() == ring.last() {
                    ring.pop();
                }
                if ring.len() < 3 {
                    return Err(GeometryError::TooFewVertices { count: ring.len() });
                }
                for vertex in &ring {
                    vertex.check_finite()?;
                }
                Ok(Geometry::Polygon { ring })
            }
        }
    }

    /// Where the feature's representative marker sits: the point itself, or
    /// the first ring vertex of a polygon.
    pub fn anchor(&self) -> Option<LatLng> {
        match self {
            Geometry::Point { coordinate } => Some(*coordinate),
            Geometry::Polygon { ring } => ring.first().copied(),
        }
    }

    /// All vertices, in order.
    pub fn coordinates(&self) -> &[LatLng] {
        match self {
            Geometry::Point { coordinate } => std::slice::from_ref(coordinate),
            Geometry::Polygon { ring } => ring,
        }
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        let mut coords = self.coordinates().iter();
        let mut bounds = LatLngBounds::from_coordinate(*coords.next()?);
        for &c in coords {
            bounds.extend(c);
        }
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<LatLng> {
        vec![
            LatLng::new(1.0, 1.0),
            LatLng::new(1.0, 2.0),
            LatLng::new(2.0, 2.0),
            LatLng::new(2.0, 1.0),
        ]
    }

    #[test]
    fn test_polygon_needs_three_vertices() {
        let result = Geometry::polygon(vec![LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)]);
        assert_eq!(result, Err(GeometryError::TooFewVertices { count: 2 }));
    }

    #[test]
    fn test_closed_ring_drops_duplicate_vertex() {
        let mut ring = square();
        ring.push(LatLng::new(1.0, 1.0));
        let Geometry::Polygon { ring } = Geometry::polygon(ring).unwrap() else {
            panic!("expected polygon");
        };
        assert_eq!(ring.len(), 4);
    }

    #[test]
    fn test_closed_triangle_with_two_distinct_vertices_is_rejected() {
        let a = LatLng::new(0.0, 0.0);
        let result = Geometry::polygon(vec![a, LatLng::new(1.0, 1.0), a]);
        assert_eq!(result, Err(GeometryError::TooFewVertices { count: 2 }));
    }

    #[test]
    fn test_non_finite_point_rejected() {
        let result = Geometry::point(LatLng::new(f64::NAN, 0.0)).normalized();
        assert!(matches!(result, Err(GeometryError::NonFiniteCoordinate { .. })));
    }

    #[test]
    fn test_polygon_anchor_is_first_vertex() {
        let polygon = Geometry::polygon(square()).unwrap();
        assert_eq!(polygon.anchor(), Some(LatLng::new(1.0, 1.0)));
    }

    #[test]
    fn test_projection_roundtrip() {
        let original = LatLng::new(-28.024, 140.887);
        let back = LatLng::unproject(original.project());
        assert!((back.lat - original.lat).abs() < 1e-9);
        assert!((back.lng - original.lng).abs() < 1e-9);
    }

    #[test]
    fn test_projection_origin_is_world_center() {
        let p = LatLng::new(0.0, 0.0).project();
        assert!((p.x - TILE_SIZE / 2.0).abs() < 1e-9);
        assert!((p.y - TILE_SIZE / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_extend_and_contains() {
        let bounds = Geometry::polygon(square()).unwrap().bounds().unwrap();
        assert_eq!(bounds.south_west, LatLng::new(1.0, 1.0));
        assert_eq!(bounds.north_east, LatLng::new(2.0, 2.0));
        assert!(bounds.contains(LatLng::new(1.5, 1.5)));
        assert!(!bounds.contains(LatLng::new(3.0, 1.5)));
    }
}
