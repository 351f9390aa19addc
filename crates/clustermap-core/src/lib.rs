//! ClusterMap Core Library
//!
//! Platform-agnostic feature store, zoom-adaptive clustering and ingest
//! logic for keeping a large, growing set of map features legible.

pub mod clustering;
pub mod config;
pub mod events;
pub mod feature;
pub mod geometry;
mod ingest;
pub mod overlay;
pub mod policy;
pub mod seed;
pub mod session;
pub mod store;
pub mod viewport;

pub use clustering::{Cluster, ClusteringEngine, GridAlgorithm};
pub use config::{ConfigError, SeedConfig, SessionConfig};
pub use events::{DrawEvent, EventHub, EventKind, MapEvent, SubscriptionId};
pub use feature::{Feature, FeatureId, Marker, MarkerId};
pub use geometry::{Geometry, GeometryError, GeometryKind, LatLng, LatLngBounds};
pub use overlay::{OverlayCall, OverlayRenderer, RecordingOverlay};
pub use policy::{Transition, ViewportPolicy};
pub use seed::Seeder;
pub use session::{MapSession, SessionError, SessionStats};
pub use store::FeatureStore;
pub use viewport::{RenderMode, ThresholdError, ViewportState};
