//! Features and their representative markers.

use crate::geometry::{Geometry, GeometryKind, LatLng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a feature. Assigned sequentially from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeatureId(pub u64);

/// Identifier of a marker. Assigned sequentially from 1, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkerId(pub u64);

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "feature#{}", self.0)
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "marker#{}", self.0)
    }
}

/// A point-renderable pin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub(crate) id: MarkerId,
    pub(crate) label: String,
    pub(crate) position: LatLng,
}

impl Marker {
    pub(crate) fn new(id: MarkerId, prefix: &str, position: LatLng) -> Self {
        Self {
            id,
            label: format!("{}{}", prefix, id.0),
            position,
        }
    }

    pub fn id(&self) -> MarkerId {
        self.id
    }

    /// Glyph shown on the pin, e.g. `T12`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    /// Text for the marker's info popup.
    pub fn info_text(&self) -> String {
        self.position.to_string()
    }
}

/// A geospatial entity with exactly one representative marker.
///
/// Features are immutable once created; the marker is owned by the feature
/// so the one-to-one pairing cannot be broken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub(crate) id: FeatureId,
    pub(crate) geometry: Geometry,
    pub(crate) marker: Marker,
}

impl Feature {
    pub fn id(&self) -> FeatureId {
        self.id
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn kind(&self) -> GeometryKind {
        self.geometry.kind()
    }

    pub fn marker(&self) -> &Marker {
        &self.marker
    }

    pub fn marker_id(&self) -> MarkerId {
        self.marker.id
    }
}
