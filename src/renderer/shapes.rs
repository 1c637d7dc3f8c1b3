//! Shape generation for 2D primitives
//!
//! Every helper appends triangles to an output list; coordinates are in
//! pixels with y down.

use glam::Vec2;
use std::f32::consts::TAU;

use super::palette::Rgba;
use super::vertex::Vertex;

#[inline]
fn tri(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: Rgba) {
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));
}

/// Filled triangle
pub fn triangle(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: Rgba) {
    tri(out, a, b, c, color);
}

/// Filled quad from four corners in winding order
pub fn quad(out: &mut Vec<Vertex>, corners: [Vec2; 4], color: Rgba) {
    let [a, b, c, d] = corners;
    tri(out, a, b, c, color);
    tri(out, a, c, d, color);
}

/// Trapezoid spanning two horizontal edges, as used for road strips
pub fn trapezoid(
    out: &mut Vec<Vertex>,
    (near_left, near_right, near_y): (f32, f32, f32),
    (far_left, far_right, far_y): (f32, f32, f32),
    color: Rgba,
) {
    quad(
        out,
        [
            Vec2::new(near_left, near_y),
            Vec2::new(near_right, near_y),
            Vec2::new(far_right, far_y),
            Vec2::new(far_left, far_y),
        ],
        color,
    );
}

/// Filled convex polygon (triangle fan from the first point)
pub fn polygon(out: &mut Vec<Vertex>, points: &[Vec2], color: Rgba) {
    if points.len() < 3 {
        return;
    }
    for pair in points[1..].windows(2) {
        tri(out, points[0], pair[0], pair[1], color);
    }
}

/// Axis-aligned filled rectangle from its top-left corner
pub fn rect(out: &mut Vec<Vertex>, min: Vec2, size: Vec2, color: Rgba) {
    let max = min + size;
    quad(
        out,
        [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)],
        color,
    );
}

/// Rectangle with a vertical gradient (top colour to bottom colour)
pub fn gradient_rect(out: &mut Vec<Vertex>, min: Vec2, size: Vec2, top: Rgba, bottom: Rgba) {
    let max = min + size;
    out.push(Vertex::new(min.x, min.y, top));
    out.push(Vertex::new(max.x, min.y, top));
    out.push(Vertex::new(max.x, max.y, bottom));

    out.push(Vertex::new(min.x, min.y, top));
    out.push(Vertex::new(max.x, max.y, bottom));
    out.push(Vertex::new(min.x, max.y, bottom));
}

/// Rectangle outline of the given stroke width, drawn inside the bounds
pub fn rect_outline(out: &mut Vec<Vertex>, min: Vec2, size: Vec2, width: f32, color: Rgba) {
    let w = width.min(size.x * 0.5).min(size.y * 0.5).max(0.0);
    rect(out, min, Vec2::new(size.x, w), color);
    rect(out, Vec2::new(min.x, min.y + size.y - w), Vec2::new(size.x, w), color);
    rect(out, Vec2::new(min.x, min.y + w), Vec2::new(w, size.y - 2.0 * w), color);
    rect(
        out,
        Vec2::new(min.x + size.x - w, min.y + w),
        Vec2::new(w, size.y - 2.0 * w),
        color,
    );
}

/// Thick line segment
pub fn line(out: &mut Vec<Vertex>, from: Vec2, to: Vec2, width: f32, color: Rgba) {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    // Perpendicular for width
    let perp = Vec2::new(-dir.y, dir.x) * (width * 0.5);
    quad(out, [from + perp, to + perp, to - perp, from - perp], color);
}

/// Filled ellipse
pub fn ellipse(out: &mut Vec<Vertex>, center: Vec2, radii: Vec2, color: Rgba, segments: u32) {
    let segments = segments.max(3);
    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        // Triangle from center to edge
        tri(
            out,
            center,
            center + radii * Vec2::new(theta1.cos(), theta1.sin()),
            center + radii * Vec2::new(theta2.cos(), theta2.sin()),
            color,
        );
    }
}

/// Ellipse outline (ring) of the given stroke width
pub fn ellipse_ring(
    out: &mut Vec<Vertex>,
    center: Vec2,
    radii: Vec2,
    width: f32,
    color: Rgba,
    segments: u32,
) {
    let segments = segments.max(3);
    let half = width * 0.5;
    let inner_r = (radii - Vec2::splat(half)).max(Vec2::ZERO);
    let outer_r = radii + Vec2::splat(half);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;
        let d1 = Vec2::new(theta1.cos(), theta1.sin());
        let d2 = Vec2::new(theta2.cos(), theta2.sin());

        // Two triangles per segment
        quad(
            out,
            [
                center + inner_r * d1,
                center + outer_r * d1,
                center + outer_r * d2,
                center + inner_r * d2,
            ],
            color,
        );
    }
}

/// Rotate vertices about the origin then move them to `origin`
pub fn place(vertices: &mut [Vertex], origin: Vec2, angle: f32) {
    let rot = Vec2::from_angle(angle);
    for v in vertices {
        let p = rot.rotate(Vec2::from(v.position)) + origin;
        v.position = p.into();
    }
}
