//! Two-state policy switching between clustered and expanded rendering.

use crate::clustering::ClusteringEngine;
use crate::geometry::LatLngBounds;
use crate::overlay::OverlayRenderer;
use crate::store::FeatureStore;
use crate::viewport::{RenderMode, ThresholdError, ViewportState, parse_threshold};

/// Outcome of evaluating the policy after a viewport change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Mode did not change; only the zoom readout moved.
    Unchanged,
    /// Clustering was switched off and this many features were shown directly.
    Expanded { features: usize },
    /// Clustering was switched on and this many features left the direct overlay.
    Clustered { features: usize },
}

/// Decides the render mode from zoom and threshold and applies mode switches.
///
/// Mode switches walk the whole feature set: entering `Expanded` adds every
/// feature to the direct overlay, entering `Clustered` hands every marker back
/// to the cluster layer and removes every feature from the direct overlay.
/// Zoom changes that stay within a mode never touch the overlay's direct
/// features, so repeated events are idempotent.
#[derive(Debug, Clone)]
pub struct ViewportPolicy {
    state: ViewportState,
    mode: RenderMode,
    min_zoom: u8,
    max_zoom: u8,
}

impl ViewportPolicy {
    /// Create the policy in the mode the initial zoom calls for.
    ///
    /// Reversed zoom bounds are swapped.
    pub fn new(initial_zoom: f64, threshold: u8, min_zoom: u8, max_zoom: u8) -> Self {
        let state = ViewportState::new(initial_zoom, threshold);
        Self {
            mode: state.target_mode(),
            state,
            min_zoom: min_zoom.min(max_zoom),
            max_zoom: min_zoom.max(max_zoom),
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn zoom(&self) -> f64 {
        self.state.zoom
    }

    pub fn threshold(&self) -> u8 {
        self.state.threshold
    }

    /// Validate and apply a threshold submitted through the settings form.
    ///
    /// The mode is not re-evaluated here: the new threshold applies from the
    /// next zoom change (or an explicit [`ViewportPolicy::recheck`]). On error
    /// the prior threshold is kept.
    pub fn submit_threshold(&mut self, input: &str) -> Result<u8, ThresholdError> {
        let threshold = parse_threshold(input, self.min_zoom, self.max_zoom)?;
        self.state.threshold = threshold;
        log::info!("Clustering threshold set to {}", threshold);
        Ok(threshold)
    }

    /// Record new visible bounds and refresh clusters if clustering.
    pub fn on_bounds_changed<O: OverlayRenderer + ?Sized>(
        &mut self,
        bounds: LatLngBounds,
        engine: &mut ClusteringEngine,
        overlay: &mut O,
    ) {
        self.state.bounds = Some(bounds);
        engine.set_bounds(Some(bounds));
        if self.mode.is_clustered() {
            overlay.draw_clusters(&engine.clusters());
        }
    }

    /// Handle a zoom change event.
    ///
    /// The zoom is stored before the mode is evaluated.
    pub fn on_zoom_changed<O: OverlayRenderer + ?Sized>(
        &mut self,
        zoom: f64,
        store: &FeatureStore,
        engine: &mut ClusteringEngine,
        overlay: &mut O,
    ) -> Transition {
        self.state.zoom = zoom;
        let regridded = engine.set_zoom(zoom);
        let transition = self.apply(store, engine, overlay);
        if transition == Transition::Unchanged && regridded && self.mode.is_clustered() {
            overlay.draw_clusters(&engine.clusters());
        }
        transition
    }

    /// Re-evaluate the mode at the current zoom, as a zoom event would.
    pub fn recheck<O: OverlayRenderer + ?Sized>(
        &mut self,
        store: &FeatureStore,
        engine: &mut ClusteringEngine,
        overlay: &mut O,
    ) -> Transition {
        self.apply(store, engine, overlay)
    }

    fn apply<O: OverlayRenderer + ?Sized>(
        &mut self,
        store: &FeatureStore,
        engine: &mut ClusteringEngine,
        overlay: &mut O,
    ) -> Transition {
        let target = self.state.target_mode();
        if target == self.mode {
            return Transition::Unchanged;
        }
        self.mode = target;
        log::info!(
            "Switching to {} mode at zoom {} (threshold {})",
            target.name(),
            self.state.zoom,
            self.state.threshold
        );

        match target {
            RenderMode::Expanded => {
                engine.disable();
                overlay.show_cluster_layer(false);
                let mut features = 0;
                for feature in store.all_features() {
                    overlay.add_feature_direct(feature);
                    features += 1;
                }
                Transition::Expanded { features }
            }
            RenderMode::Clustered => {
                engine.enable(store.markers());
                overlay.show_cluster_layer(true);
                for marker in store.markers() {
                    overlay.add_marker_to_cluster_layer(marker);
                }
                overlay.draw_clusters(&engine.clusters());
                let mut features = 0;
                for feature in store.all_features() {
                    overlay.remove_feature_direct(feature);
                    features += 1;
                }
                Transition::Clustered { features }
            }
        }
    }
}
