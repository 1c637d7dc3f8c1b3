//! The player's car, drawn in screen space
//!
//! All proportions are fractions of the car's on-screen width and height so
//! the same outline scales with the viewport.

use glam::Vec2;
use std::f32::consts::TAU;

use super::palette::{Palette, Rgba, colors, lerp_color, rgb, rgba};
use super::shapes;
use super::vertex::Vertex;
use crate::profile::{BodyStyle, Cosmetics, WheelStyle};

/// Largest on-screen car width (px)
pub const MAX_CAR_WIDTH: f32 = 220.0;
/// Car width as a fraction of the viewport width
pub const CAR_WIDTH_FRACTION: f32 = 0.26;
/// Car height relative to its width
pub const CAR_ASPECT: f32 = 0.62;

/// Where and how to draw the car this frame
#[derive(Debug, Clone, Copy)]
pub struct CarPose {
    pub center: Vec2,
    pub width: f32,
    /// Body roll (radians)
    pub tilt: f32,
    /// Spoke rotation (radians)
    pub wheel_spin: f32,
}

impl CarPose {
    pub fn height(&self) -> f32 {
        self.width * CAR_ASPECT
    }
}

/// Silhouette of one body style, in fractions of (width, height)
struct BodyProfile {
    body: [(f32, f32); 4],
    roof: [(f32, f32); 4],
    /// Truck bed or spoiler: (x, y, w, h)
    trim: Option<(f32, f32, f32, f32)>,
}

fn profile(style: BodyStyle) -> BodyProfile {
    match style {
        BodyStyle::Hatch => BodyProfile {
            body: [(-0.45, 0.24), (0.45, 0.24), (0.36, -0.26), (-0.36, -0.26)],
            roof: [(-0.18, -0.02), (0.20, -0.02), (0.12, -0.26), (-0.12, -0.26)],
            trim: None,
        },
        BodyStyle::Coupe => BodyProfile {
            body: [(-0.44, 0.22), (0.44, 0.22), (0.34, -0.30), (-0.34, -0.30)],
            roof: [(-0.16, -0.05), (0.18, -0.05), (0.10, -0.30), (-0.10, -0.30)],
            trim: None,
        },
        BodyStyle::Truck => BodyProfile {
            body: [(-0.46, 0.22), (0.46, 0.22), (0.40, -0.30), (-0.40, -0.30)],
            roof: [(-0.20, -0.06), (0.22, -0.06), (0.14, -0.30), (-0.14, -0.30)],
            trim: Some((-0.34, -0.08, 0.68, 0.18)),
        },
        BodyStyle::Super => BodyProfile {
            body: [(-0.48, 0.18), (0.48, 0.18), (0.34, -0.34), (-0.34, -0.34)],
            roof: [(-0.14, -0.18), (0.16, -0.18), (0.08, -0.34), (-0.08, -0.34)],
            trim: Some((-0.18, -0.38, 0.36, 0.06)),
        },
    }
}

/// Tyre and rim look for a wheel set
struct WheelLook {
    tire: Rgba,
    rim: Rgba,
    /// Radii as fractions of (width, height)
    radii: (f32, f32),
    spokes: bool,
}

fn wheel_look(style: WheelStyle) -> WheelLook {
    match style {
        WheelStyle::Classic => WheelLook {
            tire: rgb(0x0f1218),
            rim: rgb(0xcfd8ff),
            radii: (0.14, 0.18),
            spokes: false,
        },
        WheelStyle::Sport => WheelLook {
            tire: rgb(0x0a0c10),
            rim: rgb(0xeaf2ff),
            radii: (0.14, 0.18),
            spokes: true,
        },
        WheelStyle::Chunky => WheelLook {
            tire: rgb(0x10151e),
            rim: rgb(0xb8c6ff),
            radii: (0.18, 0.22),
            spokes: true,
        },
    }
}

/// Append the car (shadow, body, lights, wheels) to `out`
pub fn draw_car(
    out: &mut Vec<Vertex>,
    pose: &CarPose,
    cosmetics: &Cosmetics,
    palette: &Palette,
    segments: u32,
) {
    let w = pose.width;
    let h = pose.height();
    let at = |(fx, fy): (f32, f32)| Vec2::new(fx * w, fy * h);

    // Shadow stays flat on the road
    shapes::ellipse(
        out,
        pose.center + Vec2::new(0.0, h * 0.32),
        Vec2::new(w * 0.42, h * 0.16),
        colors::SHADOW,
        segments,
    );

    // Everything else is built around the origin, then tilted into place
    let mut car = Vec::with_capacity(256);
    let shape = profile(cosmetics.body);
    let body_color = rgb(cosmetics.color.hex());
    let roof_color = lerp_color(body_color, rgb(0x000000), palette.roof_shade);

    let body = shape.body.map(at);
    shapes::polygon(&mut car, &body, body_color);
    for i in 0..body.len() {
        shapes::line(&mut car, body[i], body[(i + 1) % body.len()], 2.0, colors::OUTLINE);
    }
    shapes::polygon(&mut car, &shape.roof.map(at), roof_color);
    if let Some((x, y, tw, th)) = shape.trim {
        let fill = match cosmetics.body {
            BodyStyle::Super => colors::INK,
            _ => colors::OUTLINE,
        };
        shapes::rect(&mut car, at((x, y)), at((tw, th)), fill);
    }

    // Headlights
    for x in [-0.34, 0.18] {
        shapes::rect(&mut car, at((x, -0.28)), at((0.16, 0.08)), palette.headlight);
    }

    let look = wheel_look(cosmetics.wheels);
    for x in [-0.28, 0.28] {
        draw_wheel(&mut car, at((x, 0.18)), at(look.radii), &look, pose.wheel_spin, segments);
    }

    // Rear lights
    for x in [-0.34, 0.18] {
        shapes::rect(&mut car, at((x, 0.12)), at((0.16, 0.06)), colors::REAR_LIGHT);
    }

    shapes::place(&mut car, pose.center, pose.tilt);
    out.extend(car);
}

fn draw_wheel(
    out: &mut Vec<Vertex>,
    center: Vec2,
    radii: Vec2,
    look: &WheelLook,
    spin: f32,
    segments: u32,
) {
    shapes::ellipse(out, center, radii, look.tire, segments);
    shapes::ellipse_ring(out, center, radii, 2.0, rgba(0x000000, 0.35), segments);
    shapes::ellipse_ring(out, center, radii * 0.55, 2.0, look.rim, segments);

    if look.spokes {
        for i in 0..5 {
            let a = (i as f32 / 5.0) * TAU + spin;
            let tip = center + radii * 0.62 * Vec2::new(a.cos(), a.sin());
            shapes::line(out, center, tip, 1.0, colors::SPOKE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose() -> CarPose {
        CarPose {
            center: Vec2::new(640.0, 547.0),
            width: 200.0,
            tilt: 0.0,
            wheel_spin: 0.0,
        }
    }

    fn draw(cosmetics: Cosmetics) -> Vec<Vertex> {
        let mut out = Vec::new();
        draw_car(&mut out, &pose(), &cosmetics, &Palette::DAY, 16);
        out
    }

    #[test]
    fn test_car_stays_near_its_center() {
        for body in BodyStyle::ALL {
            for wheels in WheelStyle::ALL {
                let verts = draw(Cosmetics {
                    body,
                    wheels,
                    ..Default::default()
                });
                assert!(!verts.is_empty());
                for v in &verts {
                    let d = Vec2::from(v.position) - pose().center;
                    assert!(d.x.abs() <= 101.0, "{body:?} x {}", d.x);
                    assert!(d.y.abs() <= 62.0, "{body:?} y {}", d.y);
                }
            }
        }
    }

    #[test]
    fn test_spoked_wheels_add_geometry() {
        let classic = draw(Cosmetics::default());
        let sport = draw(Cosmetics {
            wheels: WheelStyle::Sport,
            ..Default::default()
        });
        assert!(sport.len() > classic.len());
    }

    #[test]
    fn test_paint_colour_is_used() {
        let lava = rgb(crate::profile::CarColor::Lava.hex());
        let verts = draw(Cosmetics {
            color: crate::profile::CarColor::Lava,
            ..Default::default()
        });
        assert!(verts.iter().any(|v| v.color == lava));
    }

    #[test]
    fn test_trimmed_bodies_differ() {
        let hatch = draw(Cosmetics::default());
        let truck = draw(Cosmetics {
            body: BodyStyle::Truck,
            ..Default::default()
        });
        // Truck bed is one extra quad
        assert_eq!(truck.len(), hatch.len() + 6);
    }
}
