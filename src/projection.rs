//! Document space <-> canvas pixel projection.
//!
//! Every conversion between stored geometry and the drawing surface goes
//! through [`Projection`], so drawing, reconciling and reloading all use the
//! exact same forward/inverse pair. Zoom helpers live here too.

use crate::constants::zoom;
use crate::model::{BoundingBox, Point};

/// A rectangle in canvas pixel space (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Normalized rect spanning two points, whichever way the pointer was
    /// dragged.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        Self::new(
            p1.x.min(p2.x),
            p1.y.min(p2.y),
            (p1.x - p2.x).abs(),
            (p1.y - p2.y).abs(),
        )
    }

    /// Largest absolute difference between any component of the two rects.
    pub fn max_delta(&self, other: &PixelRect) -> f64 {
        (self.left - other.left)
            .abs()
            .max((self.top - other.top).abs())
            .max((self.width - other.width).abs())
            .max((self.height - other.height).abs())
    }
}

/// Uniform scale between document space and canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    scale: f64,
}

impl Projection {
    /// Create a projection. Non-positive or non-finite scales fall back to
    /// the minimum scale so the inverse stays defined.
    pub fn new(scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            zoom::MIN_SCALE
        };
        Self { scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Forward transform: document bbox to canvas pixels.
    pub fn to_canvas(&self, bbox: &BoundingBox) -> PixelRect {
        PixelRect::new(
            bbox.x * self.scale,
            bbox.y * self.scale,
            bbox.width * self.scale,
            bbox.height * self.scale,
        )
    }

    /// Inverse transform: canvas pixels back to a document bbox.
    pub fn to_document(&self, rect: &PixelRect) -> BoundingBox {
        BoundingBox::new(
            rect.left / self.scale,
            rect.top / self.scale,
            rect.width / self.scale,
            rect.height / self.scale,
        )
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

/// Scale that fits a page into the container width, floored to two decimals
/// and clamped to `min_scale`. Returns 1.0 when either width is unknown.
pub fn fit_width_scale(page_width: f64, container_width: f64, padding: f64, min_scale: f64) -> f64 {
    if page_width <= 0.0 || container_width <= 0.0 {
        return 1.0;
    }
    let available = (container_width - padding).max(0.0);
    let scale = (available / page_width * 100.0).floor() / 100.0;
    scale.max(min_scale)
}

/// Clamp a requested scale to the floor.
pub fn clamp_scale(scale: f64, min_scale: f64) -> f64 {
    if scale.is_finite() {
        scale.max(min_scale)
    } else {
        min_scale
    }
}

/// Step the scale up.
pub fn zoom_in(scale: f64, step: f64) -> f64 {
    round_hundredths(scale + step)
}

/// Step the scale down, never below `min_scale`.
pub fn zoom_out(scale: f64, step: f64, min_scale: f64) -> f64 {
    round_hundredths(scale - step).max(min_scale)
}

// Keeps repeated 0.1 steps from accumulating float noise (0.30000000000000004)
fn round_hundredths(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_round_trip_at_many_scales() {
        let bbox = BoundingBox::new(12.345, 678.9, 100.01, 0.333);
        for scale in [0.1, 0.25, 0.33, 0.5, 0.97, 1.0, 1.5, 2.0, 3.7, 10.0] {
            let p = Projection::new(scale);
            let back = p.to_document(&p.to_canvas(&bbox));
            assert!(back.approx_eq(&bbox, EPSILON), "scale {scale}: {back:?}");
        }
    }

    #[test]
    fn test_forward_projection() {
        let p = Projection::new(1.5);
        let rect = p.to_canvas(&BoundingBox::new(10.0, 20.0, 100.0, 50.0));
        assert_eq!(rect, PixelRect::new(15.0, 30.0, 150.0, 75.0));
    }

    #[test]
    fn test_invalid_scale_falls_back() {
        assert_eq!(Projection::new(0.0).scale(), zoom::MIN_SCALE);
        assert_eq!(Projection::new(-2.0).scale(), zoom::MIN_SCALE);
        assert_eq!(Projection::new(f64::NAN).scale(), zoom::MIN_SCALE);
    }

    #[test]
    fn test_from_corners_normalizes_direction() {
        let forward = PixelRect::from_corners(Point::new(10.0, 10.0), Point::new(110.0, 60.0));
        let backward = PixelRect::from_corners(Point::new(110.0, 60.0), Point::new(10.0, 10.0));
        let mixed = PixelRect::from_corners(Point::new(110.0, 10.0), Point::new(10.0, 60.0));
        assert_eq!(forward, PixelRect::new(10.0, 10.0, 100.0, 50.0));
        assert_eq!(forward, backward);
        assert_eq!(forward, mixed);
    }

    #[test]
    fn test_fit_width_scale() {
        // (1000 - 80) / 612 = 1.503... -> 1.50
        assert!(approx_eq(fit_width_scale(612.0, 1000.0, 80.0, 0.1), 1.5));
        // Tiny container clamps to the floor
        assert!(approx_eq(fit_width_scale(612.0, 50.0, 80.0, 0.1), 0.1));
        // Unknown sizes keep 1.0
        assert!(approx_eq(fit_width_scale(0.0, 1000.0, 80.0, 0.1), 1.0));
        assert!(approx_eq(fit_width_scale(612.0, 0.0, 80.0, 0.1), 1.0));
    }

    #[test]
    fn test_zoom_steps() {
        assert!(approx_eq(zoom_in(0.2, 0.1), 0.3));
        assert!(approx_eq(zoom_out(0.3, 0.1, 0.1), 0.2));
        assert!(approx_eq(zoom_out(0.15, 0.1, 0.1), 0.1));
        assert!(approx_eq(clamp_scale(0.01, 0.1), 0.1));
        assert!(approx_eq(clamp_scale(f64::INFINITY, 0.1), 0.1));
    }

    #[test]
    fn test_max_delta() {
        let a = PixelRect::new(0.0, 0.0, 10.0, 10.0);
        let b = PixelRect::new(0.5, 0.0, 12.0, 10.0);
        assert!(approx_eq(a.max_delta(&b), 2.0));
    }
}
