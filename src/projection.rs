//! Perspective projection from road space to screen space
//!
//! World coordinates: x lateral (world units), y up, z forward along the
//! track. Screen coordinates are pixels with y down.

use glam::Vec3;

/// Closest depth the projection divides by
pub const MIN_DEPTH: f32 = 1e-4;

/// Footprint calibration for coins (world radius → pixels)
pub const COIN_CALIBRATION: f32 = 4.0;
/// Footprint calibration for obstacles (world width/height → pixels)
pub const OBSTACLE_CALIBRATION: f32 = 3.3;

/// Screen dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Build a viewport, clamping degenerate sizes to at least one pixel
    pub fn from_size(width: f32, height: f32) -> Self {
        let sane = |v: f32| if v.is_finite() { v.max(1.0) } else { 1.0 };
        Self {
            width: sane(width),
            height: sane(height),
        }
    }

    /// Whether a screen y lies inside the viewport, with slack above and below
    #[inline]
    pub fn contains_y(&self, y: f32, above: f32, below: f32) -> bool {
        y >= -above && y <= self.height + below
    }

    /// Whether a screen x lies inside the viewport, with the same slack on both sides
    #[inline]
    pub fn contains_x(&self, x: f32, margin: f32) -> bool {
        x >= -margin && x <= self.width + margin
    }
}

/// A projected point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f32,
    pub y: f32,
    /// Perspective scale at this depth (`focal / depth`)
    pub scale: f32,
}

/// Project a world point through a camera.
///
/// Points at or behind the camera get the minimum depth and a huge scale;
/// culling them is the caller's job.
#[inline]
pub fn project(world: Vec3, camera: Vec3, focal_depth: f32, viewport: Viewport) -> Projected {
    let depth = (world.z - camera.z).max(MIN_DEPTH);
    let scale = focal_depth / depth;
    let (w, h) = (viewport.width, viewport.height);
    Projected {
        x: (1.0 + scale * (world.x - camera.x) / w) * w * 0.5,
        y: (1.0 - scale * (world.y - camera.y) / h) * h * 0.5,
        scale,
    }
}

/// On-screen size of something `world_size` big at a given scale
#[inline]
pub fn footprint(scale: f32, world_size: f32, calibration: f32) -> f32 {
    scale * world_size * calibration
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn view() -> Viewport {
        Viewport::from_size(1280.0, 720.0)
    }

    #[test]
    fn test_point_ahead_on_axis_is_centered() {
        let p = project(Vec3::new(0.0, 0.0, 500.0), Vec3::ZERO, 1250.0, view());
        assert_eq!(p.x, 640.0);
        assert_eq!(p.y, 360.0);
        assert_eq!(p.scale, 2.5);
    }

    #[test]
    fn test_ground_below_camera_projects_below_center() {
        let cam = Vec3::new(0.0, 820.0, 0.0);
        let p = project(Vec3::new(0.0, 0.0, 2000.0), cam, 1250.0, view());
        assert!(p.y > 360.0);
        // Farther ground climbs toward the horizon
        let far = project(Vec3::new(0.0, 0.0, 20_000.0), cam, 1250.0, view());
        assert!(far.y < p.y && far.y > 360.0);
    }

    #[test]
    fn test_behind_camera_is_floored() {
        let p = project(Vec3::new(0.0, 0.0, -100.0), Vec3::ZERO, 1250.0, view());
        assert!(p.scale.is_finite());
        assert_eq!(p.scale, 1250.0 / MIN_DEPTH);
    }

    #[test]
    fn test_viewport_clamps_degenerate_size() {
        let v = Viewport::from_size(0.0, f32::NAN);
        assert_eq!((v.width, v.height), (1.0, 1.0));
        let p = project(Vec3::new(10.0, 10.0, 10.0), Vec3::ZERO, 1250.0, v);
        assert!(p.x.is_finite() && p.y.is_finite());
    }

    #[test]
    fn test_contains_y() {
        let v = view();
        assert!(v.contains_y(-50.0, 80.0, 0.0));
        assert!(!v.contains_y(-100.0, 80.0, 0.0));
        assert!(v.contains_y(760.0, 0.0, 60.0));
        assert!(!v.contains_y(800.0, 0.0, 60.0));
    }

    #[test]
    fn test_contains_x() {
        let v = view();
        assert!(v.contains_x(-20.0, 30.0));
        assert!(v.contains_x(1300.0, 30.0));
        assert!(!v.contains_x(1320.0, 30.0));
        assert!(!v.contains_x(f32::NAN, 30.0));
    }

    #[test]
    fn test_footprint() {
        assert_eq!(footprint(0.5, 26.0, COIN_CALIBRATION), 52.0);
        assert_eq!(footprint(0.0, 80.0, OBSTACLE_CALIBRATION), 0.0);
    }

    proptest! {
        #[test]
        fn prop_scale_shrinks_with_depth(a in 1.0f32..50_000.0, gap in 1.0f32..50_000.0) {
            let v = view();
            let near = project(Vec3::new(0.0, 0.0, a), Vec3::ZERO, 1250.0, v);
            let far = project(Vec3::new(0.0, 0.0, a + gap), Vec3::ZERO, 1250.0, v);
            prop_assert!(near.scale > far.scale);
        }

        #[test]
        fn prop_lateral_offset_converges_on_center(x in -3000.0f32..3000.0, z in 10.0f32..40_000.0) {
            let v = view();
            let near = project(Vec3::new(x, 0.0, z), Vec3::ZERO, 1250.0, v);
            let far = project(Vec3::new(x, 0.0, z * 2.0), Vec3::ZERO, 1250.0, v);
            prop_assert!((far.x - 640.0).abs() <= (near.x - 640.0).abs() + 1e-3);
        }
    }
}
