//! Day and night colour palettes

/// Linear RGBA, 0..1
pub type Rgba = [f32; 4];

/// Opaque colour from a 0xRRGGBB literal
pub const fn rgb(hex: u32) -> Rgba {
    rgba(hex, 1.0)
}

/// Colour from a 0xRRGGBB literal with alpha
pub const fn rgba(hex: u32, alpha: f32) -> Rgba {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        alpha,
    ]
}

/// Same colour, different alpha
#[inline]
pub fn with_alpha(c: Rgba, alpha: f32) -> Rgba {
    [c[0], c[1], c[2], alpha]
}

/// Channel-wise blend, `t` clamped to [0, 1]
#[inline]
pub fn lerp_color(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// Distance haze: blend toward the fog colour by `depth * strength`.
/// The source alpha is kept.
#[inline]
pub fn fog_blend(color: Rgba, fog: Rgba, depth: f32, strength: f32) -> Rgba {
    let mixed = lerp_color(color, fog, depth * strength);
    with_alpha(mixed, color[3])
}

/// Everything the scene pulls its colours from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub sky_top: Rgba,
    pub sky_bottom: Rgba,
    pub fog: Rgba,
    /// Fog overlay strength across the lower screen
    pub fog_overlay: f32,
    pub road: [Rgba; 2],
    pub lane: Rgba,
    pub grass: [Rgba; 2],
    pub curb: [Rgba; 2],
    pub building: [Rgba; 2],
    pub tree: [Rgba; 2],
    /// Sun by day, moon by night
    pub glow: Rgba,
    pub coin: Rgba,
    pub coin_glow: Rgba,
    pub cone: Rgba,
    pub block: Rgba,
    pub headlight: Rgba,
    /// Tint of the high-speed streaks
    pub streak: Rgba,
    /// How much the roof darkens toward black
    pub roof_shade: f32,
}

impl Palette {
    pub const DAY: Palette = Palette {
        sky_top: rgb(0x89d5ff),
        sky_bottom: rgb(0xfff0c6),
        fog: rgb(0xffe8c9),
        fog_overlay: 0.14,
        road: [rgb(0x2a2f3a), rgb(0x262b34)],
        lane: rgba(0xffffff, 0.35),
        grass: [rgb(0x56c27a), rgb(0x4ab06d)],
        curb: [rgb(0xdfe6f5), rgb(0xb9c5df)],
        building: [rgb(0xa8b7d6), rgb(0x8ea1c6)],
        tree: [rgb(0x2f7a4b), rgb(0x3f9a5f)],
        glow: rgba(0xffd278, 0.35),
        coin: rgb(0xffd36b),
        coin_glow: rgba(0xffdc78, 0.21),
        cone: rgb(0xff6a4d),
        block: rgb(0x66a3ff),
        headlight: rgba(0xffffff, 0.55),
        streak: rgb(0xffd36b),
        roof_shade: 0.18,
    };

    pub const NIGHT: Palette = Palette {
        sky_top: rgb(0x071024),
        sky_bottom: rgb(0x0b1a3c),
        fog: rgb(0x0b1833),
        fog_overlay: 0.18,
        road: [rgb(0x131722), rgb(0x10141e)],
        lane: rgba(0xc8dcff, 0.22),
        grass: [rgb(0x1f3b2e), rgb(0x193226)],
        curb: [rgb(0x7f8fb5), rgb(0x5d6a8a)],
        building: [rgb(0x2d3550), rgb(0x1f263d)],
        tree: [rgb(0x153425), rgb(0x1e4a35)],
        glow: rgba(0x78a0ff, 0.18),
        coin: rgb(0xbcd6ff),
        coin_glow: rgba(0x78b4ff, 0.18),
        cone: rgb(0xff8aa3),
        block: rgb(0x8fb0ff),
        headlight: rgba(0xdcebff, 0.95),
        streak: rgb(0x8fb0ff),
        roof_shade: 0.35,
    };

    pub fn for_night(night: bool) -> &'static Palette {
        if night { &Self::NIGHT } else { &Self::DAY }
    }
}

/// Fixed colours that don't change with time of day
pub mod colors {
    use super::{Rgba, rgb, rgba};

    pub const SHADOW: Rgba = rgba(0x000000, 0.35);
    pub const OUTLINE: Rgba = rgba(0x000000, 0.18);
    pub const INK: Rgba = rgba(0x000000, 0.25);
    pub const BEVEL: Rgba = rgba(0xffffff, 0.10);
    pub const REAR_LIGHT: Rgba = rgba(0xff5e7a, 0.55);
    pub const SPOKE: Rgba = rgba(0xffffff, 0.25);
    pub const POPUP_GAIN: Rgba = rgb(0x7cffb3);
    pub const POPUP_LOSS: Rgba = rgb(0xff5e7a);
}
