//! Turning drawn shapes into features.

use crate::events::DrawEvent;
use crate::feature::FeatureId;
use crate::geometry::{Geometry, GeometryResult, LatLng};
use crate::overlay::OverlayRenderer;
use crate::session::MapSession;
use crate::viewport::RenderMode;

impl<O: OverlayRenderer> MapSession<O> {
    /// Add a drawn point and show its marker in the current mode.
    pub fn ingest_point(&mut self, coordinate: LatLng) -> GeometryResult<FeatureId> {
        self.ingest(Geometry::point(coordinate))
    }

    /// Add a drawn polygon. Its marker sits on the first ring vertex.
    ///
    /// Fails without side effects if the ring has fewer than 3 vertices.
    pub fn ingest_polygon(&mut self, ring: Vec<LatLng>) -> GeometryResult<FeatureId> {
        self.ingest(Geometry::Polygon { ring })
    }

    /// Dispatch a drawing-tool completion event.
    pub fn handle_draw(&mut self, event: DrawEvent) -> GeometryResult<FeatureId> {
        match event {
            DrawEvent::Point { coordinate } => self.ingest_point(coordinate),
            DrawEvent::Polygon { ring } => self.ingest_polygon(ring),
        }
    }

    fn ingest(&mut self, geometry: Geometry) -> GeometryResult<FeatureId> {
        let kind = geometry.kind();
        let feature = self.store.add_feature(geometry).inspect_err(|e| {
            log::warn!("Rejected drawn {:?}: {}", kind, e);
        })?;

        match self.policy.mode() {
            RenderMode::Clustered => {
                self.engine.add_marker(feature.marker());
                self.overlay.add_marker_to_cluster_layer(feature.marker());
                self.overlay.draw_clusters(&self.engine.clusters());
            }
            RenderMode::Expanded => self.overlay.add_feature_direct(feature),
        }
        // The surface does not notice programmatic additions by itself.
        self.overlay.request_redraw();

        log::debug!("Added {} ({})", feature.id(), feature.marker().label());
        Ok(feature.id())
    }

    /// Add many geometries, redrawing once at the end.
    ///
    /// Invalid geometries are skipped and logged. Returns the number added.
    pub fn ingest_batch(&mut self, geometries: impl IntoIterator<Item = Geometry>) -> usize {
        let mode = self.policy.mode();
        let mut added = 0;
        for geometry in geometries {
            let feature = match self.store.add_feature(geometry) {
                Ok(feature) => feature,
                Err(e) => {
                    log::warn!("Skipping seeded geometry: {}", e);
                    continue;
                }
            };
            match mode {
                RenderMode::Clustered => {
                    self.engine.add_marker(feature.marker());
                    self.overlay.add_marker_to_cluster_layer(feature.marker());
                }
                RenderMode::Expanded => self.overlay.add_feature_direct(feature),
            }
            added += 1;
        }
        if added > 0 {
            if mode.is_clustered() {
                self.overlay.draw_clusters(&self.engine.clusters());
            }
            self.overlay.request_redraw();
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SessionConfig;
    use crate::events::DrawEvent;
    use crate::feature::FeatureId;
    use crate::geometry::{Geometry, GeometryError, LatLng};
    use crate::overlay::{OverlayCall, RecordingOverlay};
    use crate::session::MapSession;

    fn session(zoom: f64) -> MapSession<RecordingOverlay> {
        let config = SessionConfig {
            initial_zoom: zoom,
            ..SessionConfig::default()
        };
        let mut session = MapSession::new(config, RecordingOverlay::new()).unwrap();
        session.overlay_mut().take_calls();
        session
    }

    #[test]
    fn test_identical_draws_make_distinct_features() {
        let mut session = session(3.0);
        let a = session.ingest_point(LatLng::new(5.0, 5.0)).unwrap();
        let b = session.ingest_point(LatLng::new(5.0, 5.0)).unwrap();
        assert_ne!(a, b);
        let labels: Vec<&str> = session.store().markers().map(|m| m.label()).collect();
        assert_eq!(labels, vec!["T1", "T2"]);
    }

    #[test]
    fn test_invalid_polygon_has_no_side_effects() {
        let mut session = session(3.0);
        let result = session.ingest_polygon(vec![LatLng::new(0.0, 0.0), LatLng::new(1.0, 0.0)]);
        assert_eq!(result, Err(GeometryError::TooFewVertices { count: 2 }));
        assert!(session.store().is_empty());
        assert!(session.overlay().calls().is_empty());
    }

    #[test]
    fn test_handle_draw_dispatches_by_shape() {
        let mut session = session(12.0);
        let point = session
            .handle_draw(DrawEvent::Point {
                coordinate: LatLng::new(0.0, 0.0),
            })
            .unwrap();
        let polygon = session
            .handle_draw(DrawEvent::Polygon {
                ring: vec![
                    LatLng::new(0.0, 0.0),
                    LatLng::new(0.0, 1.0),
                    LatLng::new(1.0, 1.0),
                ],
            })
            .unwrap();
        assert_eq!((point, polygon), (FeatureId(1), FeatureId(2)));
        assert_eq!(session.store().point_count(), 1);
        assert_eq!(session.store().polygon_count(), 1);
        assert_eq!(session.overlay().direct_features().len(), 2);
    }

    #[test]
    fn test_batch_redraws_once() {
        let mut session = session(3.0);
        let geometries = vec![
            Geometry::point(LatLng::new(0.0, 0.0)),
            Geometry::Polygon { ring: vec![] },
            Geometry::point(LatLng::new(10.0, 10.0)),
        ];
        assert_eq!(session.ingest_batch(geometries), 2);

        let calls = session.overlay().calls();
        let redraws = calls.iter().filter(|c| **c == OverlayCall::RequestRedraw).count();
        let draws = calls
            .iter()
            .filter(|c| matches!(c, OverlayCall::DrawClusters(_)))
            .count();
        assert_eq!((redraws, draws), (1, 1));
        assert_eq!(session.engine().member_count(), 2);
    }
}
