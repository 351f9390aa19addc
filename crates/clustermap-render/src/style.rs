//! Colors and sizes for pins, cluster badges and outlines.

use peniko::Color;

/// Counts at or below this never use the hot color, however small the mean.
const MIN_HOT_COUNT: f64 = 10.0;

/// Visual style of the overlay.
#[derive(Debug, Clone, Copy)]
pub struct OverlayStyle {
    /// Badge color for clusters larger than usual.
    pub hot: Color,
    /// Badge color for the rest.
    pub cool: Color,
    /// Pin fill.
    pub pin: Color,
    /// Pin glyph color.
    pub glyph: Color,
    /// Polygon outline stroke.
    pub outline: Color,
    pub outline_width: f64,
    /// Badge radius for a two-member cluster, in pixels.
    pub base_radius: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            hot: Color::from_rgba8(255, 0, 0, 255),
            cool: Color::from_rgba8(0, 0, 255, 255),
            pin: Color::from_rgba8(234, 67, 53, 255),
            glyph: Color::from_rgba8(255, 255, 255, 255),
            outline: Color::from_rgba8(30, 30, 30, 255),
            outline_width: 1.0,
            base_radius: 15.0,
        }
    }
}

impl OverlayStyle {
    /// Hot if the count is above both the mean count and a floor of 10.
    pub fn badge_color(&self, count: usize, mean: f64) -> Color {
        if count as f64 > mean.max(MIN_HOT_COUNT) {
            self.hot
        } else {
            self.cool
        }
    }

    /// Radius grows with the order of magnitude of the count.
    pub fn badge_radius(&self, count: usize) -> f64 {
        self.base_radius + 4.0 * (count.max(1) as f64).log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_color_threshold() {
        let style = OverlayStyle::default();
        assert_eq!(style.badge_color(50, 20.0), style.hot);
        assert_eq!(style.badge_color(15, 20.0), style.cool);
        assert_eq!(style.badge_color(8, 2.0), style.cool);
        assert_eq!(style.badge_color(11, 2.0), style.hot);
    }

    #[test]
    fn test_badge_radius_grows() {
        let style = OverlayStyle::default();
        assert!(style.badge_radius(1000) > style.badge_radius(10));
        assert!((style.badge_radius(1) - style.base_radius).abs() < f64::EPSILON);
    }
}
