//! Interface to the map surface that draws markers, clusters and polygons.

use crate::clustering::Cluster;
use crate::feature::{Feature, FeatureId, Marker, MarkerId};
use std::collections::BTreeSet;

/// Trait for map surfaces.
///
/// The core only pushes state changes; implementations decide how to draw.
pub trait OverlayRenderer {
    /// Show or hide the cluster layer as a whole.
    fn show_cluster_layer(&mut self, enabled: bool);

    /// Add one marker to the cluster layer.
    fn add_marker_to_cluster_layer(&mut self, marker: &Marker);

    /// Draw a feature individually (outline and pin).
    fn add_feature_direct(&mut self, feature: &Feature);

    /// Stop drawing a feature individually.
    fn remove_feature_direct(&mut self, feature: &Feature);

    /// Ask the surface to redraw. Needed after programmatic changes, which
    /// the surface does not pick up on its own.
    fn request_redraw(&mut self);

    /// Replace the cluster icons currently on screen.
    fn draw_clusters(&mut self, clusters: &[Cluster]);
}

/// One recorded call against a [`RecordingOverlay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayCall {
    ShowClusterLayer(bool),
    AddMarkerToClusterLayer(MarkerId),
    AddFeatureDirect(FeatureId),
    RemoveFeatureDirect(FeatureId),
    RequestRedraw,
    /// Number of clusters drawn.
    DrawClusters(usize),
}

/// Overlay that records calls and tracks what would be visible.
///
/// For tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct RecordingOverlay {
    calls: Vec<OverlayCall>,
    cluster_layer_visible: bool,
    cluster_layer: BTreeSet<MarkerId>,
    direct: BTreeSet<FeatureId>,
    clusters: Vec<Cluster>,
}

impl RecordingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[OverlayCall] {
        &self.calls
    }

    /// Take the recorded calls, leaving the visible state in place.
    pub fn take_calls(&mut self) -> Vec<OverlayCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn is_cluster_layer_visible(&self) -> bool {
        self.cluster_layer_visible
    }

    /// Markers currently held by the cluster layer.
    pub fn cluster_layer_markers(&self) -> &BTreeSet<MarkerId> {
        &self.cluster_layer
    }

    /// Features currently drawn individually.
    pub fn direct_features(&self) -> &BTreeSet<FeatureId> {
        &self.direct
    }

    /// Clusters from the last draw.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }
}

impl OverlayRenderer for RecordingOverlay {
    fn show_cluster_layer(&mut self, enabled: bool) {
        self.calls.push(OverlayCall::ShowClusterLayer(enabled));
        self.cluster_layer_visible = enabled;
        if !enabled {
            self.cluster_layer.clear();
            self.clusters.clear();
        }
    }

    fn add_marker_to_cluster_layer(&mut self, marker: &Marker) {
        self.calls.push(OverlayCall::AddMarkerToClusterLayer(marker.id()));
        self.cluster_layer.insert(marker.id());
    }

    fn add_feature_direct(&mut self, feature: &Feature) {
        self.calls.push(OverlayCall::AddFeatureDirect(feature.id()));
        self.direct.insert(feature.id());
    }

    fn remove_feature_direct(&mut self, feature: &Feature) {
        self.calls.push(OverlayCall::RemoveFeatureDirect(feature.id()));
        self.direct.remove(&feature.id());
    }

    fn request_redraw(&mut self) {
        self.calls.push(OverlayCall::RequestRedraw);
    }

    fn draw_clusters(&mut self, clusters: &[Cluster]) {
        self.calls.push(OverlayCall::DrawClusters(clusters.len()));
        self.clusters = clusters.to_vec();
    }
}
