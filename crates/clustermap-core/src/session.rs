//! Session context tying the store, clustering engine, policy and overlay
//! together for the lifetime of one map view.

use crate::clustering::{ClusteringEngine, GridAlgorithm};
use crate::config::{ConfigResult, SessionConfig};
use crate::events::{EventHub, EventKind, MapEvent, SubscriptionId};
use crate::geometry::{GeometryError, LatLngBounds};
use crate::overlay::OverlayRenderer;
use crate::policy::{Transition, ViewportPolicy};
use crate::store::FeatureStore;
use crate::viewport::{RenderMode, ThresholdError};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced while handling a single event. None of them end the session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Rejected geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("Rejected threshold: {0}")]
    Threshold(#[from] ThresholdError),
}

/// Snapshot of session counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    pub features: usize,
    pub points: usize,
    pub polygons: usize,
    pub mode: RenderMode,
    pub zoom: f64,
    pub threshold: u8,
    pub clusters: usize,
}

/// One mapping session.
///
/// All state that the map surface, drawing tool and settings form act upon
/// lives here. Every mutation goes through `&mut self`, so a mode switch's
/// walk over the feature set can never interleave with an insertion.
pub struct MapSession<O: OverlayRenderer> {
    id: Uuid,
    config: SessionConfig,
    pub(crate) store: FeatureStore,
    pub(crate) engine: ClusteringEngine,
    pub(crate) policy: ViewportPolicy,
    pub(crate) overlay: O,
    subscription: Option<SubscriptionId>,
}

impl<O: OverlayRenderer> MapSession<O> {
    /// Start a session and put the overlay into the initial mode.
    ///
    /// Fails if the configuration does not validate.
    pub fn new(config: SessionConfig, mut overlay: O) -> ConfigResult<Self> {
        config.validate()?;
        let policy = ViewportPolicy::new(
            config.initial_zoom,
            config.clustering_threshold,
            config.min_zoom,
            config.max_zoom,
        );
        let mut engine = ClusteringEngine::new(GridAlgorithm::new(config.grid_size), config.initial_zoom);
        if policy.mode().is_clustered() {
            engine.enable(std::iter::empty());
        }
        overlay.show_cluster_layer(policy.mode().is_clustered());

        let id = Uuid::new_v4();
        log::info!(
            "Session {} started at zoom {} in {} mode",
            id,
            config.initial_zoom,
            policy.mode().name()
        );

        Ok(Self {
            id,
            store: FeatureStore::new(config.marker_label_prefix.clone()),
            config,
            engine,
            policy,
            overlay,
            subscription: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &FeatureStore {
        &self.store
    }

    pub fn engine(&self) -> &ClusteringEngine {
        &self.engine
    }

    pub fn policy(&self) -> &ViewportPolicy {
        &self.policy
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut O {
        &mut self.overlay
    }

    pub fn mode(&self) -> RenderMode {
        self.policy.mode()
    }

    /// End the session and hand back the overlay.
    pub fn into_overlay(self) -> O {
        self.overlay
    }

    /// Handle a zoom change reported by the map surface.
    pub fn on_zoom_changed(&mut self, zoom: f64) -> Transition {
        self.policy
            .on_zoom_changed(zoom, &self.store, &mut self.engine, &mut self.overlay)
    }

    /// Handle a pan or resize of the visible area.
    pub fn on_bounds_changed(&mut self, bounds: LatLngBounds) {
        self.policy
            .on_bounds_changed(bounds, &mut self.engine, &mut self.overlay);
    }

    /// Apply a threshold from the settings form. Takes effect on the next
    /// zoom change; see [`MapSession::recheck`].
    pub fn submit_threshold(&mut self, value: &str) -> Result<u8, ThresholdError> {
        self.policy.submit_threshold(value).inspect_err(|e| {
            log::warn!("Ignoring threshold submission: {}", e);
        })
    }

    /// Re-evaluate the mode at the current zoom without waiting for an event.
    pub fn recheck(&mut self) -> Transition {
        self.policy
            .recheck(&self.store, &mut self.engine, &mut self.overlay)
    }

    /// Whether the engine state agrees with the policy's mode.
    pub fn is_mode_consistent(&self) -> bool {
        self.engine.is_enabled() == self.policy.mode().is_clustered()
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            features: self.store.len(),
            points: self.store.point_count(),
            polygons: self.store.polygon_count(),
            mode: self.policy.mode(),
            zoom: self.policy.zoom(),
            threshold: self.policy.threshold(),
            clusters: self.engine.clusters().len(),
        }
    }

    /// Dispatch one event. Errors are reported but leave state untouched.
    pub fn handle_event(&mut self, event: MapEvent) -> Result<(), SessionError> {
        match event {
            MapEvent::ZoomChanged { zoom } => {
                self.on_zoom_changed(zoom);
            }
            MapEvent::BoundsChanged { bounds } => self.on_bounds_changed(bounds),
            MapEvent::DrawComplete { shape } => {
                self.handle_draw(shape)?;
            }
            MapEvent::ThresholdSubmitted { value } => {
                self.submit_threshold(&value)?;
            }
        }
        Ok(())
    }

    /// Subscribe this session to all map events. Calling it again is a no-op.
    pub fn attach(&mut self, hub: &mut EventHub) -> SubscriptionId {
        *self
            .subscription
            .get_or_insert_with(|| hub.subscribe(&EventKind::ALL))
    }

    /// Unsubscribe at teardown. Returns false if not attached.
    pub fn detach(&mut self, hub: &mut EventHub) -> bool {
        match self.subscription.take() {
            Some(id) => hub.unsubscribe(id),
            None => false,
        }
    }

    /// Handle every queued event in order. Returns how many were applied.
    pub fn pump(&mut self, hub: &mut EventHub) -> usize {
        let Some(id) = self.subscription else {
            return 0;
        };
        let events = hub.drain(id);
        let total = events.len();
        let mut applied = 0;
        for event in events {
            match self.handle_event(event) {
                Ok(()) => applied += 1,
                Err(e) => log::warn!("Event rejected: {}", e),
            }
        }
        log::debug!("Pumped {} events ({} rejected)", total, total - applied);
        applied
    }
}
