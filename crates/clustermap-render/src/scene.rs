//! Retained overlay scene and frame building.
//!
//! [`SceneOverlay`] keeps what the session pushed to it and turns it into a
//! flat list of screen-space draw items for a given camera.

use crate::camera::MapCamera;
use crate::style::OverlayStyle;
use clustermap_core::clustering::Cluster;
use clustermap_core::feature::{Feature, FeatureId, Marker, MarkerId};
use clustermap_core::geometry::{Geometry, LatLng};
use clustermap_core::overlay::OverlayRenderer;
use kurbo::{BezPath, Point, Rect, Shape};
use peniko::Color;
use std::collections::{BTreeMap, HashMap};

/// Items within this many pixels outside the viewport are still emitted.
const CULL_MARGIN: f64 = 32.0;

/// A pin as the scene remembers it.
#[derive(Debug, Clone, PartialEq)]
struct Pin {
    label: String,
    position: LatLng,
}

impl From<&Marker> for Pin {
    fn from(marker: &Marker) -> Self {
        Self {
            label: marker.label().to_string(),
            position: marker.position(),
        }
    }
}

/// A feature drawn outside the cluster layer.
#[derive(Debug, Clone)]
struct DirectFeature {
    ring: Vec<LatLng>,
    pin: Pin,
}

/// One screen-space drawing instruction.
#[derive(Debug, Clone)]
pub enum DrawItem {
    /// A cluster icon showing its member count.
    Badge {
        center: Point,
        radius: f64,
        fill: Color,
        count: usize,
    },
    /// A single marker with its label glyph.
    Pin {
        at: Point,
        label: String,
        fill: Color,
        glyph: Color,
    },
    /// A polygon outline.
    Outline {
        path: BezPath,
        stroke: Color,
        width: f64,
    },
}

/// Draw items for one redraw, in paint order.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub items: Vec<DrawItem>,
}

impl Frame {
    pub fn badge_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, DrawItem::Badge { .. }))
            .count()
    }

    pub fn pin_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, DrawItem::Pin { .. }))
            .count()
    }

    pub fn outline_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, DrawItem::Outline { .. }))
            .count()
    }

    /// Labels of all pins, in paint order.
    pub fn pin_labels(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|i| match i {
                DrawItem::Pin { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Overlay that retains cluster and feature state for frame building.
#[derive(Debug, Clone, Default)]
pub struct SceneOverlay {
    style: OverlayStyle,
    cluster_layer_visible: bool,
    /// Markers held by the cluster layer.
    cluster_pins: HashMap<MarkerId, Pin>,
    clusters: Vec<Cluster>,
    direct: BTreeMap<FeatureId, DirectFeature>,
    redraw_pending: bool,
    redraws: u64,
}

impl SceneOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    pub fn is_cluster_layer_visible(&self) -> bool {
        self.cluster_layer_visible
    }

    /// Features currently drawn individually.
    pub fn direct_count(&self) -> usize {
        self.direct.len()
    }

    /// Total redraw requests received.
    pub fn redraw_requests(&self) -> u64 {
        self.redraws
    }

    /// Whether a redraw was requested since the last call; clears the flag.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_pending)
    }

    /// Build the draw list for the camera. Clusters paint below direct
    /// features; each feature paints its outline below its pin.
    pub fn build_frame(&self, camera: &MapCamera) -> Frame {
        let transform = camera.transform();
        let screen = Rect::from_origin_size(Point::ZERO, camera.viewport).inflate(CULL_MARGIN, CULL_MARGIN);
        let mut items = Vec::new();

        if self.cluster_layer_visible {
            let groups: Vec<&Cluster> = self.clusters.iter().filter(|c| !c.is_single()).collect();
            let mean = if groups.is_empty() {
                0.0
            } else {
                groups.iter().map(|c| c.count()).sum::<usize>() as f64 / groups.len() as f64
            };

            for cluster in &self.clusters {
                let center = transform * cluster.position.project();
                if !screen.contains(center) {
                    continue;
                }
                if cluster.is_single() {
                    let label = cluster
                        .markers
                        .first()
                        .and_then(|id| self.cluster_pins.get(id))
                        .map(|pin| pin.label.clone())
                        .unwrap_or_default();
                    items.push(self.pin_item(center, label));
                } else {
                    let count = cluster.count();
                    items.push(DrawItem::Badge {
                        center,
                        radius: self.style.badge_radius(count),
                        fill: self.style.badge_color(count, mean),
                        count,
                    });
                }
            }
        }

        for feature in self.direct.values() {
            if feature.ring.len() >= 3 {
                let mut path = BezPath::new();
                for (i, vertex) in feature.ring.iter().enumerate() {
                    let p = transform * vertex.project();
                    if i == 0 {
                        path.move_to(p);
                    } else {
                        path.line_to(p);
                    }
                }
                path.close_path();
                if path.bounding_box().intersect(screen).area() > 0.0 {
                    items.push(DrawItem::Outline {
                        path,
                        stroke: self.style.outline,
                        width: self.style.outline_width,
                    });
                }
            }
            let at = transform * feature.pin.position.project();
            if screen.contains(at) {
                items.push(self.pin_item(at, feature.pin.label.clone()));
            }
        }

        log::trace!("Built frame with {} items", items.len());
        Frame { items }
    }

    fn pin_item(&self, at: Point, label: String) -> DrawItem {
        DrawItem::Pin {
            at,
            label,
            fill: self.style.pin,
            glyph: self.style.glyph,
        }
    }
}

impl OverlayRenderer for SceneOverlay {
    fn show_cluster_layer(&mut self, enabled: bool) {
        self.cluster_layer_visible = enabled;
        if !enabled {
            self.cluster_pins.clear();
            self.clusters.clear();
        }
    }

    fn add_marker_to_cluster_layer(&mut self, marker: &Marker) {
        self.cluster_pins.insert(marker.id(), Pin::from(marker));
    }

    fn add_feature_direct(&mut self, feature: &Feature) {
        let ring = match feature.geometry() {
            Geometry::Polygon { ring } => ring.clone(),
            Geometry::Point { .. } => Vec::new(),
        };
        self.direct.insert(
            feature.id(),
            DirectFeature {
                ring,
                pin: Pin::from(feature.marker()),
            },
        );
    }

    fn remove_feature_direct(&mut self, feature: &Feature) {
        self.direct.remove(&feature.id());
    }

    fn request_redraw(&mut self) {
        self.redraw_pending = true;
        self.redraws += 1;
    }

    fn draw_clusters(&mut self, clusters: &[Cluster]) {
        self.clusters = clusters.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clustermap_core::config::SessionConfig;
    use clustermap_core::session::MapSession;
    use kurbo::Size;

    fn session(zoom: f64) -> MapSession<SceneOverlay> {
        let config = SessionConfig {
            initial_zoom: zoom,
            ..SessionConfig::default()
        };
        MapSession::new(config, SceneOverlay::new()).unwrap()
    }

    fn camera(zoom: f64) -> MapCamera {
        MapCamera::new(LatLng::new(0.0, 0.0), zoom, Size::new(800.0, 600.0))
    }

    fn square(lat: f64, lng: f64) -> Vec<LatLng> {
        vec![
            LatLng::new(lat, lng),
            LatLng::new(lat + 0.1, lng),
            LatLng::new(lat + 0.1, lng + 0.1),
            LatLng::new(lat, lng + 0.1),
        ]
    }

    #[test]
    fn test_clustered_frame_has_badge() {
        let mut session = session(3.0);
        session.ingest_point(LatLng::new(0.0, 0.0)).unwrap();
        session.ingest_point(LatLng::new(0.05, 0.05)).unwrap();
        session.ingest_polygon(square(0.0, 0.0)).unwrap();

        let frame = session.overlay().build_frame(&camera(3.0));
        assert_eq!(frame.badge_count(), 1);
        assert_eq!(frame.pin_count(), 0);
        assert_eq!(frame.outline_count(), 0);
        assert!(session.overlay_mut().take_redraw_request());
        assert!(!session.overlay_mut().take_redraw_request());
    }

    #[test]
    fn test_single_cluster_renders_as_labelled_pin() {
        let mut session = session(3.0);
        session.ingest_point(LatLng::new(0.0, 0.0)).unwrap();

        let frame = session.overlay().build_frame(&camera(3.0));
        assert_eq!(frame.badge_count(), 0);
        assert_eq!(frame.pin_labels(), vec!["T1"]);
    }

    #[test]
    fn test_expanded_frame_draws_every_feature() {
        let mut session = session(12.0);
        session.ingest_point(LatLng::new(0.0, 0.0)).unwrap();
        session.ingest_polygon(square(0.001, 0.001)).unwrap();

        let frame = session.overlay().build_frame(&camera(12.0));
        assert_eq!(frame.badge_count(), 0);
        assert_eq!(frame.outline_count(), 1);
        assert_eq!(frame.pin_labels(), vec!["T1", "T2"]);
    }

    #[test]
    fn test_mode_switch_swaps_layers() {
        let mut session = session(12.0);
        session.ingest_point(LatLng::new(0.0, 0.0)).unwrap();
        session.ingest_point(LatLng::new(0.01, 0.01)).unwrap();
        assert_eq!(session.overlay().direct_count(), 2);
        assert!(!session.overlay().is_cluster_layer_visible());

        session.on_zoom_changed(3.0);
        assert_eq!(session.overlay().direct_count(), 0);
        assert!(session.overlay().is_cluster_layer_visible());
        assert_eq!(session.overlay().build_frame(&camera(3.0)).badge_count(), 1);

        session.on_zoom_changed(12.0);
        assert_eq!(session.overlay().direct_count(), 2);
        assert!(!session.overlay().is_cluster_layer_visible());
    }

    #[test]
    fn test_reclustered_single_keeps_label() {
        let mut session = session(3.0);
        session.ingest_point(LatLng::new(0.0, 0.0)).unwrap();
        session.on_zoom_changed(12.0);
        session.on_zoom_changed(3.0);

        let frame = session.overlay().build_frame(&camera(3.0));
        assert_eq!(frame.pin_labels(), vec!["T1"]);
    }

    #[test]
    fn test_offscreen_items_are_culled() {
        let mut session = session(12.0);
        session.ingest_point(LatLng::new(45.0, 90.0)).unwrap();
        let frame = session.overlay().build_frame(&camera(12.0));
        assert!(frame.items.is_empty());
    }
}
