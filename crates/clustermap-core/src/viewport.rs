//! Viewport state, render modes and threshold validation.

use crate::geometry::LatLngBounds;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Zoom level at or above which features are shown individually.
pub const DEFAULT_CLUSTERING_THRESHOLD: u8 = 10;

/// Lowest zoom level supported by the map surface.
pub const MIN_ZOOM: u8 = 0;

/// Highest zoom level supported by the map surface.
pub const MAX_ZOOM: u8 = 21;

/// Errors from a threshold form submission.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("Threshold is not a number: {0:?}")]
    NotNumeric(String),
    #[error("Threshold must be a whole zoom level, got {0}")]
    NotInteger(f64),
}

/// Parse a submitted threshold as an integer zoom level.
///
/// Values outside `min..=max` are clamped into it.
pub fn parse_threshold(input: &str, min: u8, max: u8) -> Result<u8, ThresholdError> {
    let trimmed = input.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| ThresholdError::NotNumeric(trimmed.to_string()))?;
    if !value.is_finite() {
        return Err(ThresholdError::NotNumeric(trimmed.to_string()));
    }
    if value.fract() != 0.0 {
        return Err(ThresholdError::NotInteger(value));
    }
    let clamped = value.clamp(f64::from(min), f64::from(max)) as u8;
    if f64::from(clamped) != value {
        log::debug!("Threshold {} clamped to {}", value, clamped);
    }
    Ok(clamped)
}

/// How the whole feature set is currently drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RenderMode {
    /// Markers are aggregated by the clustering engine.
    Clustered,
    /// Every feature is drawn individually on the direct overlay.
    Expanded,
}

impl RenderMode {
    /// Mode for a zoom level. The threshold itself is on the expanded side.
    pub fn for_zoom(zoom: f64, threshold: u8) -> Self {
        if zoom >= f64::from(threshold) {
            RenderMode::Expanded
        } else {
            RenderMode::Clustered
        }
    }

    pub fn is_clustered(self) -> bool {
        self == RenderMode::Clustered
    }

    pub fn name(self) -> &'static str {
        match self {
            RenderMode::Clustered => "Clustered",
            RenderMode::Expanded => "Expanded",
        }
    }
}

/// Zoom, threshold and visible bounds of one map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub zoom: f64,
    pub threshold: u8,
    pub bounds: Option<LatLngBounds>,
}

impl ViewportState {
    pub fn new(zoom: f64, threshold: u8) -> Self {
        Self {
            zoom,
            threshold,
            bounds: None,
        }
    }

    /// Mode the current zoom and threshold call for.
    pub fn target_mode(&self) -> RenderMode {
        RenderMode::for_zoom(self.zoom, self.threshold)
    }

    /// Text for the on-map zoom readout.
    pub fn readout(&self) -> String {
        format!("Zoom level: {}", self.zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundary_is_expanded() {
        assert_eq!(RenderMode::for_zoom(10.0, 10), RenderMode::Expanded);
        assert_eq!(RenderMode::for_zoom(9.0, 10), RenderMode::Clustered);
        assert_eq!(RenderMode::for_zoom(9.99, 10), RenderMode::Clustered);
        assert_eq!(RenderMode::for_zoom(0.0, 0), RenderMode::Expanded);
    }

    #[test]
    fn test_parse_threshold_accepts_integers() {
        assert_eq!(parse_threshold("12", MIN_ZOOM, MAX_ZOOM), Ok(12));
        assert_eq!(parse_threshold(" 7 ", MIN_ZOOM, MAX_ZOOM), Ok(7));
        assert_eq!(parse_threshold("4.0", MIN_ZOOM, MAX_ZOOM), Ok(4));
    }

    #[test]
    fn test_parse_threshold_rejects_garbage() {
        assert!(matches!(
            parse_threshold("ten", MIN_ZOOM, MAX_ZOOM),
            Err(ThresholdError::NotNumeric(_))
        ));
        assert!(matches!(
            parse_threshold("", MIN_ZOOM, MAX_ZOOM),
            Err(ThresholdError::NotNumeric(_))
        ));
        assert!(matches!(
            parse_threshold("inf", MIN_ZOOM, MAX_ZOOM),
            Err(ThresholdError::NotNumeric(_))
        ));
        assert_eq!(
            parse_threshold("8.5", MIN_ZOOM, MAX_ZOOM),
            Err(ThresholdError::NotInteger(8.5))
        );
    }

    #[test]
    fn test_parse_threshold_clamps_out_of_range() {
        assert_eq!(parse_threshold("22", MIN_ZOOM, MAX_ZOOM), Ok(21));
        assert_eq!(parse_threshold("-1", MIN_ZOOM, MAX_ZOOM), Ok(0));
        assert_eq!(parse_threshold("1e6", MIN_ZOOM, MAX_ZOOM), Ok(21));
    }

    #[test]
    fn test_readout() {
        assert_eq!(ViewportState::new(8.0, 10).readout(), "Zoom level: 8");
    }
}
