//! Grid-based marker clustering.
//!
//! Markers are bucketed into square cells of a fixed on-screen size. Because
//! the cell edge is constant in screen pixels, it shrinks in world units as
//! the zoom level grows, so clusters split apart when zooming in.

use crate::feature::{Marker, MarkerId};
use crate::geometry::{LatLng, LatLngBounds};
use kurbo::{Point, Rect};
use serde::Serialize;
use std::collections::HashMap;

/// Default cluster cell edge, in screen pixels.
pub const DEFAULT_GRID_SIZE: f64 = 60.0;

/// Highest zoom level used for bucketing; keeps cell edges representable.
const MAX_GRID_ZOOM: i32 = 30;

/// Integer cell coordinates at a given grid zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct CellKey {
    y: i64,
    x: i64,
}

/// Fixed-pixel grid partition of the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridAlgorithm {
    /// Cell edge in screen pixels.
    pub grid_size: f64,
}

impl Default for GridAlgorithm {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
        }
    }
}

impl GridAlgorithm {
    pub fn new(grid_size: f64) -> Self {
        Self { grid_size }
    }

    /// Discrete zoom level the grid is built for.
    pub fn grid_zoom(zoom: f64) -> i32 {
        if zoom.is_finite() {
            (zoom.floor() as i32).clamp(0, MAX_GRID_ZOOM)
        } else {
            0
        }
    }

    /// Cell edge in world units at the given zoom.
    pub fn cell_edge(&self, grid_zoom: i32) -> f64 {
        self.grid_size / 2f64.powi(grid_zoom)
    }

    fn cell_of(&self, position: LatLng, grid_zoom: i32) -> CellKey {
        let world = position.project();
        let edge = self.cell_edge(grid_zoom);
        CellKey {
            x: (world.x / edge).floor() as i64,
            y: (world.y / edge).floor() as i64,
        }
    }

    fn cell_rect(&self, key: CellKey, grid_zoom: i32) -> Rect {
        let edge = self.cell_edge(grid_zoom);
        let origin = Point::new(key.x as f64 * edge, key.y as f64 * edge);
        Rect::from_origin_size(origin, (edge, edge))
    }
}

/// One visible aggregation: a single marker or a group of nearby markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Centroid of the member positions.
    pub position: LatLng,
    /// Member markers, in the order they joined the cell.
    pub markers: Vec<MarkerId>,
}

impl Cluster {
    pub fn count(&self) -> usize {
        self.markers.len()
    }

    /// A one-member cell is drawn as the plain marker, not a badge.
    pub fn is_single(&self) -> bool {
        self.markers.len() == 1
    }
}

#[derive(Debug, Clone, Default)]
struct Bucket {
    markers: Vec<MarkerId>,
    lat_sum: f64,
    lng_sum: f64,
}

impl Bucket {
    fn push(&mut self, id: MarkerId, position: LatLng) {
        self.markers.push(id);
        self.lat_sum += position.lat;
        self.lng_sum += position.lng;
    }

    fn to_cluster(&self) -> Cluster {
        let n = self.markers.len() as f64;
        Cluster {
            position: LatLng::new(self.lat_sum / n, self.lng_sum / n),
            markers: self.markers.clone(),
        }
    }
}

/// Aggregates markers into clusters while enabled.
///
/// The engine keeps its own copy of member ids and positions; the markers
/// themselves stay owned by the feature store.
#[derive(Debug, Clone)]
pub struct ClusteringEngine {
    algorithm: GridAlgorithm,
    enabled: bool,
    members: Vec<(MarkerId, LatLng)>,
    buckets: HashMap<CellKey, Bucket>,
    grid_zoom: i32,
    bounds: Option<LatLngBounds>,
}

impl ClusteringEngine {
    /// Create a disabled engine for the given zoom level.
    pub fn new(algorithm: GridAlgorithm, zoom: f64) -> Self {
        Self {
            algorithm,
            enabled: false,
            members: Vec::new(),
            buckets: HashMap::new(),
            grid_zoom: GridAlgorithm::grid_zoom(zoom),
            bounds: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn algorithm(&self) -> GridAlgorithm {
        self.algorithm
    }

    /// Number of markers in the live aggregation.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Activate clustering over exactly `markers`, replacing any prior set.
    pub fn enable<'a>(&mut self, markers: impl IntoIterator<Item = &'a Marker>) {
        self.enabled = true;
        self.members = markers.into_iter().map(|m| (m.id(), m.position())).collect();
        self.rebuild();
        log::debug!(
            "Clustering enabled with {} markers in {} cells",
            self.members.len(),
            self.buckets.len()
        );
    }

    /// Insert one marker into the live aggregation.
    ///
    /// Does nothing while disabled; the marker is picked up the next time
    /// the engine is enabled with the full set. Returns whether the marker
    /// was incorporated.
    pub fn add_marker(&mut self, marker: &Marker) -> bool {
        if !self.enabled {
            return false;
        }
        let (id, position) = (marker.id(), marker.position());
        self.members.push((id, position));
        let key = self.algorithm.cell_of(position, self.grid_zoom);
        self.buckets.entry(key).or_default().push(id, position);
        true
    }

    /// Deactivate clustering and drop the aggregation.
    ///
    /// Returns how many markers were released, all of which the caller must
    /// now render individually.
    pub fn disable(&mut self) -> usize {
        let released = self.members.len();
        self.enabled = false;
        self.members.clear();
        self.buckets.clear();
        released
    }

    /// Follow a zoom change. Returns true if the grid was rebuilt.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        let grid_zoom = GridAlgorithm::grid_zoom(zoom);
        if grid_zoom == self.grid_zoom {
            return false;
        }
        self.grid_zoom = grid_zoom;
        if self.enabled {
            self.rebuild();
            return true;
        }
        false
    }

    /// Restrict reported clusters to cells touching `bounds`.
    pub fn set_bounds(&mut self, bounds: Option<LatLngBounds>) {
        self.bounds = bounds;
    }

    /// Current aggregation, ordered by cell (row-major).
    ///
    /// Empty while disabled or when there are no members.
    pub fn clusters(&self) -> Vec<Cluster> {
        if !self.enabled {
            return Vec::new();
        }
        let view = self.bounds.map(|b| b.to_world_rect());
        let mut keys: Vec<&CellKey> = self
            .buckets
            .keys()
            .filter(|&&key| match view {
                Some(view) => overlaps(view, self.algorithm.cell_rect(key, self.grid_zoom)),
                None => true,
            })
            .collect();
        keys.sort();
        keys.into_iter()
            .map(|key| self.buckets[key].to_cluster())
            .collect()
    }

    fn rebuild(&mut self) {
        self.buckets.clear();
        for &(id, position) in &self.members {
            let key = self.algorithm.cell_of(position, self.grid_zoom);
            self.buckets.entry(key).or_default().push(id, position);
        }
    }
}

/// Closed-interval overlap, so a degenerate view still selects its cell.
fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}
