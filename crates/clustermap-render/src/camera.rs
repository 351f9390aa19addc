//! Map camera for Web-Mercator pan/zoom transforms.

use clustermap_core::geometry::{LatLng, LatLngBounds};
use kurbo::{Affine, Point, Size, Vec2};

/// Camera looking at a point of the map at a given zoom level.
///
/// At zoom `z` one world unit (see [`LatLng::project`]) spans `2^z` screen
/// pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCamera {
    /// Map position at the center of the viewport.
    pub center: LatLng,
    /// Current zoom level.
    pub zoom: f64,
    /// Viewport size in pixels.
    pub viewport: Size,
    /// Lowest zoom [`MapCamera::set_zoom`] will accept.
    pub min_zoom: f64,
    /// Highest zoom [`MapCamera::set_zoom`] will accept.
    pub max_zoom: f64,
}

impl Default for MapCamera {
    fn default() -> Self {
        Self {
            center: LatLng::new(0.0, 0.0),
            zoom: 3.0,
            viewport: Size::new(800.0, 600.0),
            min_zoom: 0.0,
            max_zoom: 21.0,
        }
    }
}

impl MapCamera {
    pub fn new(center: LatLng, zoom: f64, viewport: Size) -> Self {
        Self {
            center,
            zoom,
            viewport,
            ..Self::default()
        }
    }

    /// Screen pixels per world unit.
    pub fn scale(&self) -> f64 {
        2f64.powf(self.zoom)
    }

    /// World-to-screen transform.
    pub fn transform(&self) -> Affine {
        let center = self.center.project();
        Affine::translate(Vec2::new(self.viewport.width / 2.0, self.viewport.height / 2.0))
            * Affine::scale(self.scale())
            * Affine::translate(-center.to_vec2())
    }

    /// Screen-to-world transform.
    pub fn inverse_transform(&self) -> Affine {
        self.transform().inverse()
    }

    pub fn to_screen(&self, coordinate: LatLng) -> Point {
        self.transform() * coordinate.project()
    }

    pub fn to_lat_lng(&self, screen_point: Point) -> LatLng {
        LatLng::unproject(self.inverse_transform() * screen_point)
    }

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, delta: Vec2) {
        let center = self.center.project() - delta / self.scale();
        self.center = LatLng::unproject(center);
    }

    /// Set the zoom level, clamped to the allowed range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Map area covered by the viewport.
    pub fn visible_bounds(&self) -> LatLngBounds {
        let south_west = self.to_lat_lng(Point::new(0.0, self.viewport.height));
        let north_east = self.to_lat_lng(Point::new(self.viewport.width, 0.0));
        LatLngBounds::new(south_west, north_east)
    }
}
