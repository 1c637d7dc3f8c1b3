//! Endless Road - An endless pseudo-3D arcade driving game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world generation, update step, collisions, run control)
//! - `projection`: Perspective projection from road space to screen space
//! - `renderer`: Frame building (road, scenery, entities, car) and the WebGPU pipeline
//! - `tuning`: Data-driven game balance
//! - `settings` / `profile`: Player preferences and the persisted save profile
//! - `audio`: Procedural sound effects

pub mod audio;
pub mod profile;
pub mod projection;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use profile::{BodyStyle, CarColor, Cosmetics, Profile, WheelStyle};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Largest frame delta the update step accepts (seconds)
    pub const MAX_FRAME_DT: f32 = 1.0 / 30.0;

    /// Camera height above the road surface (world units)
    pub const CAMERA_HEIGHT: f32 = 820.0;
    /// Camera trails the car origin by this distance
    pub const CAMERA_TRAIL: f32 = 260.0;
    /// Perspective strength (focal depth in pixels)
    pub const CAMERA_FOCAL_DEPTH: f32 = 1250.0;
    /// Fraction of the car's lateral offset the chase camera follows
    pub const CAMERA_FOLLOW: f32 = 0.6;

    /// Popup age gained per second (a popup lives ~0.7 s)
    pub const POPUP_AGE_RATE: f32 = 1.4;
    /// Coin spin speed (radians/s)
    pub const COIN_SPIN_RATE: f32 = 5.2;

    /// Speed below which the shake/streak effects stay off
    pub const FX_SPEED_FLOOR: f32 = 260.0;
    /// Speed shown as an empty gauge
    pub const GAUGE_SPEED_FLOOR: f32 = 160.0;
    /// World speed to dashboard "km/h"
    pub const KMH_PER_UNIT: f32 = 0.14;
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Frame-rate independent exponential approach of `current` toward `target`.
///
/// `decay_base` is the fraction of the gap left after one second, so
/// `damp(x, y, 0.001, dt)` closes 99.9% of the gap per second regardless of
/// how that second is sliced into frames.
#[inline]
pub fn damp(current: f32, target: f32, decay_base: f32, dt: f32) -> f32 {
    lerp(current, target, 1.0 - decay_base.powf(dt))
}

/// Normalized position of `value` between `lo` and `hi`, clamped to [0, 1]
#[inline]
pub fn unit_range(value: f32, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        return if value >= hi { 1.0 } else { 0.0 };
    }
    ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
}
