//! Canonical collection of features and their markers.

use crate::feature::{Feature, FeatureId, Marker, MarkerId};
use crate::geometry::{Geometry, GeometryError, GeometryKind, GeometryResult};

/// Default prefix for marker labels.
pub const DEFAULT_LABEL_PREFIX: &str = "T";

/// Owns every feature of a session, in insertion order.
///
/// There is no removal API; features live until the store is dropped.
#[derive(Debug, Clone)]
pub struct FeatureStore {
    features: Vec<Feature>,
    label_prefix: String,
    points: usize,
}

impl Default for FeatureStore {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_PREFIX)
    }
}

impl FeatureStore {
    /// Create an empty store whose marker labels start with `label_prefix`.
    pub fn new(label_prefix: impl Into<String>) -> Self {
        Self {
            features: Vec::new(),
            label_prefix: label_prefix.into(),
            points: 0,
        }
    }

    /// Add a feature and its representative marker.
    ///
    /// Either both are created or neither is: invalid geometry leaves the
    /// store and the id sequence untouched.
    pub fn add_feature(&mut self, geometry: Geometry) -> GeometryResult<&Feature> {
        let geometry = geometry.normalized()?;
        let anchor = geometry
            .anchor()
            .ok_or(GeometryError::TooFewVertices { count: 0 })?;

        let seq = self.features.len() as u64 + 1;
        if geometry.kind() == GeometryKind::Point {
            self.points += 1;
        }
        self.features.push(Feature {
            id: FeatureId(seq),
            geometry,
            marker: Marker::new(MarkerId(seq), &self.label_prefix, anchor),
        });
        Ok(&self.features[self.features.len() - 1])
    }

    /// Features in insertion order.
    ///
    /// The iterator is lazy and `Clone`, so a walk can be restarted; the
    /// borrow keeps the store from being mutated while it is alive.
    pub fn all_features(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    /// Markers in insertion order.
    pub fn markers(&self) -> impl Iterator<Item = &Marker> + Clone {
        self.features.iter().map(|f| &f.marker)
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        let index = usize::try_from(id.0).ok()?.checked_sub(1)?;
        self.features.get(index)
    }

    /// Look up a marker by id.
    pub fn marker(&self, id: MarkerId) -> Option<&Marker> {
        self.get(FeatureId(id.0)).map(|f| &f.marker)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.points
    }

    pub fn polygon_count(&self) -> usize {
        self.features.len() - self.points
    }

    pub fn label_prefix(&self) -> &str {
        &self.label_prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LatLng;

    fn triangle() -> Vec<LatLng> {
        vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 1.0),
            LatLng::new(1.0, 1.0),
        ]
    }

    #[test]
    fn test_labels_are_sequential_across_kinds() {
        let mut store = FeatureStore::default();
        store.add_feature(Geometry::point(LatLng::new(0.0, 0.0))).unwrap();
        store
            .add_feature(Geometry::Polygon { ring: triangle() })
            .unwrap();
        store.add_feature(Geometry::point(LatLng::new(5.0, 5.0))).unwrap();

        let labels: Vec<&str> = store.markers().map(|m| m.label()).collect();
        assert_eq!(labels, vec!["T1", "T2", "T3"]);
    }

    #[test]
    fn test_invalid_polygon_leaves_store_untouched() {
        let mut store = FeatureStore::default();
        store.add_feature(Geometry::point(LatLng::new(0.0, 0.0))).unwrap();

        let result = store.add_feature(Geometry::Polygon {
            ring: vec![LatLng::new(0.0, 0.0)],
        });
        assert!(matches!(result, Err(GeometryError::TooFewVertices { count: 1 })));
        assert_eq!(store.len(), 1);

        let next = store.add_feature(Geometry::point(LatLng::new(1.0, 1.0))).unwrap();
        assert_eq!(next.marker().label(), "T2");
    }

    #[test]
    fn test_polygon_marker_at_first_vertex() {
        let mut store = FeatureStore::default();
        let feature = store
            .add_feature(Geometry::Polygon { ring: triangle() })
            .unwrap();
        assert_eq!(feature.marker().position(), LatLng::new(0.0, 0.0));
    }

    #[test]
    fn test_duplicate_geometry_is_not_deduplicated() {
        let mut store = FeatureStore::default();
        let a = store.add_feature(Geometry::point(LatLng::new(3.0, 3.0))).unwrap().id();
        let b = store.add_feature(Geometry::point(LatLng::new(3.0, 3.0))).unwrap().id();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_all_features_is_restartable() {
        let mut store = FeatureStore::default();
        for i in 0..5 {
            store.add_feature(Geometry::point(LatLng::new(i as f64, 0.0))).unwrap();
        }
        let iter = store.all_features();
        let first: Vec<FeatureId> = iter.clone().map(|f| f.id()).collect();
        let second: Vec<FeatureId> = iter.map(|f| f.id()).collect();
        assert_eq!(first, second);
        assert_eq!(first, (1..=5).map(FeatureId).collect::<Vec<_>>());
    }

    #[test]
    fn test_lookup_and_counts() {
        let mut store = FeatureStore::new("P");
        store.add_feature(Geometry::point(LatLng::new(0.0, 0.0))).unwrap();
        store
            .add_feature(Geometry::Polygon { ring: triangle() })
            .unwrap();

        assert_eq!(store.point_count(), 1);
        assert_eq!(store.polygon_count(), 1);
        assert_eq!(store.marker(MarkerId(2)).map(|m| m.label()), Some("P2"));
        assert!(store.get(FeatureId(0)).is_none());
        assert!(store.get(FeatureId(3)).is_none());
    }
}
