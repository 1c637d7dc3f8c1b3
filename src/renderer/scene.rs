//! Frame building: turns a read-only simulation snapshot into a flat
//! triangle list in pixel space plus text labels.
//!
//! Draw order is back to front: sky, road strips far to near (with roadside
//! scenery), world objects far to near, fog overlay, speed streaks, the car,
//! then popup labels on top.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::car::{self, CAR_WIDTH_FRACTION, CarPose, MAX_CAR_WIDTH};
use super::palette::{Palette, Rgba, colors, fog_blend, with_alpha};
use super::shapes;
use super::vertex::Vertex;
use crate::consts::*;
use crate::profile::Cosmetics;
use crate::projection::{
    COIN_CALIBRATION, OBSTACLE_CALIBRATION, Projected, Viewport, footprint, project,
};
use crate::settings::Settings;
use crate::sim::hash::Channel;
use crate::sim::{COIN_RADIUS, ObjectKind, ObstacleKind, PopupTone, Simulation, WorldObject};

/// Screen-space y of the car's ground contact, as a fraction of the height
pub const CAR_SCREEN_Y: f32 = 0.76;
/// Height coins float above the road
const COIN_HOVER: f32 = 120.0;
/// Fog strength on roadside scenery and on world objects
const SCENERY_FOG: f32 = 0.85;
const OBJECT_FOG: f32 = 0.75;
/// Segments between buildings / trees
const BUILDING_EVERY: i64 = 6;
const TREE_EVERY: i64 = 12;
/// Road drift: amplitude and period (world units) of the curvature wave
const CURVE_AMPLITUDE: f32 = 0.08;
const CURVE_PERIOD: f32 = 3200.0;
/// World x drift per segment per unit of curvature
const CURVE_SPREAD: f32 = 560.0;
/// Popup rise (px over its lifetime) and font size
const POPUP_RISE: f32 = 26.0;
const POPUP_FONT_PX: f32 = 14.0;

/// A piece of text for the frontend to draw over the triangles
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    /// Centre of the text in pixels
    pub position: Vec2,
    pub color: Rgba,
    pub size: f32,
}

/// Everything needed to present one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Clear colour behind the sky
    pub clear: Rgba,
    /// Triangle list, pixel coordinates, y down
    pub vertices: Vec<Vertex>,
    pub labels: Vec<Label>,
}

impl Frame {
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// The chase camera for one frame
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    /// Current curvature of the road ahead
    pub curve: f32,
    /// Segment under the camera's track position
    pub base_segment: i64,
    pub segment_length: f32,
    pub half_width: f32,
}

impl Camera {
    /// Place the camera behind and above the car, following it sideways
    pub fn follow(sim: &Simulation) -> Self {
        let road = &sim.tuning.road;
        let half_width = road.half_width();
        Self {
            position: Vec3::new(
                sim.player.lateral * half_width * CAMERA_FOLLOW,
                CAMERA_HEIGHT,
                sim.camera - CAMERA_TRAIL,
            ),
            curve: (sim.camera / CURVE_PERIOD).sin() * CURVE_AMPLITUDE,
            base_segment: sim.camera_segment(),
            segment_length: road.segment_length,
            half_width,
        }
    }

    /// World x of the road centre at a forward position
    pub fn road_center(&self, forward: f32) -> f32 {
        let segments_ahead = forward / self.segment_length - self.base_segment as f32;
        segments_ahead * self.curve * CURVE_SPREAD
    }

    /// Project a road-space point (lateral offset, height, forward)
    pub fn project_road(
        &self,
        lateral: f32,
        height: f32,
        forward: f32,
        viewport: Viewport,
    ) -> Projected {
        let world = Vec3::new(
            self.road_center(forward) + lateral * self.half_width,
            height,
            forward,
        );
        project(world, self.position, CAMERA_FOCAL_DEPTH, viewport)
    }

    /// Projected road half-width in pixels at a given scale
    pub fn half_width_px(&self, scale: f32) -> f32 {
        scale * self.half_width * 0.5
    }

    /// Whether a forward position is far enough in front to project sanely
    pub fn in_front(&self, forward: f32) -> bool {
        forward - self.position.z > 1.0
    }
}

/// Builds frames. Its only state is the RNG for cosmetic jitter.
pub struct Renderer {
    rng: Pcg32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Renderer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Build one frame. Never touches the simulation.
    pub fn frame(
        &mut self,
        sim: &Simulation,
        cosmetics: &Cosmetics,
        settings: &Settings,
        viewport: Viewport,
    ) -> Frame {
        let palette = Palette::for_night(sim.night);
        let camera = Camera::follow(sim);
        let (w, h) = (viewport.width, viewport.height);
        let segments = settings.quality.curve_segments();
        let spd_norm = sim.speed_fx();
        let motion = settings.effective_screen_shake();

        // Camera shake
        let shake = if motion {
            let mag = sim.player.shake * (0.6 + 0.4 * self.rng.random::<f32>());
            Vec2::new(
                (self.rng.random::<f32>() - 0.5) * mag,
                (self.rng.random::<f32>() - 0.5) * mag,
            )
        } else {
            Vec2::ZERO
        };

        let mut out = Vec::with_capacity(16 * 1024);

        // --- SKY ---
        shapes::gradient_rect(
            &mut out,
            Vec2::ZERO,
            Vec2::new(w, h),
            palette.sky_top,
            palette.sky_bottom,
        );
        shapes::ellipse(
            &mut out,
            Vec2::new(w * 0.72, h * 0.18),
            Vec2::splat(w.min(h) * 0.22),
            palette.glow,
            segments * 2,
        );

        // --- ROAD & SCENERY ---
        let draw = settings
            .quality
            .road_segments()
            .min(sim.tuning.road.draw_distance)
            .max(0);
        draw_road(
            &mut out,
            &camera,
            palette,
            viewport,
            shake,
            draw,
            settings.quality.scenery_enabled(),
        );

        // --- OBJECTS ---
        let window = draw.max(1) as f32 * camera.segment_length;
        let mut objects: Vec<WorldObject> = sim
            .world
            .objects()
            .filter(|o| !(o.spent && o.kind == ObjectKind::Coin))
            .filter(|o| camera.in_front(o.forward) && o.forward - sim.camera <= window)
            .collect();
        // Far to near
        objects.sort_by(|a, b| b.forward.total_cmp(&a.forward));
        for obj in &objects {
            let depth = ((obj.forward - sim.camera) / window).clamp(0.0, 1.0);
            draw_object(&mut out, obj, &camera, palette, viewport, shake, depth, segments);
        }

        // --- FOG OVERLAY ---
        let horizon = h * 0.5;
        shapes::gradient_rect(
            &mut out,
            Vec2::new(0.0, horizon),
            Vec2::new(w, h - horizon),
            with_alpha(palette.fog, 0.0),
            with_alpha(palette.fog, palette.fog_overlay),
        );

        // --- SPEED STREAKS ---
        if settings.effective_speed_streaks() && spd_norm > 0.25 {
            let color = with_alpha(palette.streak, 0.06 * spd_norm);
            let count = settings.quality.streak_count().max(2);
            for i in 0..count {
                let x = i as f32 / (count - 1) as f32 * w;
                shapes::quad(
                    &mut out,
                    [
                        Vec2::new(x, 0.0),
                        Vec2::new(x + 80.0, h),
                        Vec2::new(x + 105.0, h),
                        Vec2::new(x + 25.0, 0.0),
                    ],
                    color,
                );
            }
        }

        // --- CAR ---
        let pose = self.car_pose(sim, &camera, viewport, spd_norm, motion);
        car::draw_car(&mut out, &pose, cosmetics, palette, segments);

        // --- POPUPS ---
        let labels = sim
            .world
            .popups
            .iter()
            .map(|p| {
                let age = p.age.clamp(0.0, 1.0);
                let base = match p.tone {
                    PopupTone::Gain => colors::POPUP_GAIN,
                    PopupTone::Loss => colors::POPUP_LOSS,
                };
                Label {
                    text: p.text.clone(),
                    position: Vec2::new(p.anchor.x * w, p.anchor.y * h - age * POPUP_RISE),
                    color: with_alpha(base, 1.0 - age),
                    size: POPUP_FONT_PX,
                }
            })
            .collect();

        Frame {
            clear: palette.sky_top,
            vertices: out,
            labels,
        }
    }

    /// The car sits at a fixed screen height; its x follows the lateral gap
    /// between the car and the chase camera at the matching depth.
    fn car_pose(
        &mut self,
        sim: &Simulation,
        camera: &Camera,
        viewport: Viewport,
        spd_norm: f32,
        motion: bool,
    ) -> CarPose {
        let (w, h) = (viewport.width, viewport.height);
        // Scale at which the ground lands on the car's screen row
        let ground_scale = (CAR_SCREEN_Y - 0.5) * 2.0 * h / CAMERA_HEIGHT;
        let gap = sim.player.lateral * camera.half_width - camera.position.x;

        let (bounce, tilt) = if motion {
            let bounce = (self.rng.random::<f32>() - 0.5) * sim.player.shake * 0.25;
            let wobble_deg = (self.rng.random::<f32>() - 0.5) * (0.8 + spd_norm * 2.6);
            (bounce, wobble_deg.to_radians())
        } else {
            (0.0, 0.0)
        };

        CarPose {
            center: Vec2::new(w * 0.5 + gap * ground_scale * 0.5, h * CAR_SCREEN_Y + bounce),
            width: MAX_CAR_WIDTH.min(w * CAR_WIDTH_FRACTION),
            tilt,
            wheel_spin: sim.run.distance * 0.02,
        }
    }
}

/// Road strips from the far end of the window back to the camera
fn draw_road(
    out: &mut Vec<Vertex>,
    camera: &Camera,
    palette: &Palette,
    viewport: Viewport,
    shake: Vec2,
    draw: i32,
    scenery: bool,
) {
    let w = viewport.width;
    let base = camera.base_segment;
    let seg = camera.segment_length;

    for n in (base..=base + draw as i64).rev() {
        let z1 = n as f32 * seg;
        let z2 = (n + 1) as f32 * seg;
        if !camera.in_front(z1) {
            continue;
        }

        let p1 = camera.project_road(0.0, 0.0, z1, viewport);
        let p2 = camera.project_road(0.0, 0.0, z2, viewport);

        // Entirely below the screen, or entirely far above it
        if !viewport.contains_y(p2.y, f32::INFINITY, 30.0) {
            continue;
        }
        if !viewport.contains_y(p1.y, 200.0, f32::INFINITY)
            && !viewport.contains_y(p2.y, 200.0, f32::INFINITY)
        {
            continue;
        }

        let stripe = (n.rem_euclid(2) == 0) as usize;
        let (x1, y1) = (p1.x + shake.x, p1.y + shake.y);
        let (x2, y2) = (p2.x + shake.x, p2.y + shake.y);
        let road1 = camera.half_width_px(p1.scale);
        let road2 = camera.half_width_px(p2.scale);
        let rumble1 = road1 * 0.13;
        let rumble2 = road2 * 0.13;

        // Grass spans the whole row
        let margin = w * 0.5;
        shapes::trapezoid(
            out,
            (-margin, w + margin, y1),
            (-margin, w + margin, y2),
            palette.grass[1 - stripe],
        );

        // Curbs
        shapes::trapezoid(
            out,
            (x1 - road1 - rumble1, x1 - road1, y1),
            (x2 - road2 - rumble2, x2 - road2, y2),
            palette.curb[1 - stripe],
        );
        shapes::trapezoid(
            out,
            (x1 + road1, x1 + road1 + rumble1, y1),
            (x2 + road2, x2 + road2 + rumble2, y2),
            palette.curb[stripe],
        );

        // Road
        shapes::trapezoid(
            out,
            (x1 - road1, x1 + road1, y1),
            (x2 - road2, x2 + road2, y2),
            palette.road[1 - stripe],
        );

        // Centre line
        let lane_w = (p1.scale * 2.0).max(1.0);
        shapes::line(out, Vec2::new(x1, y1), Vec2::new(x2, y2), lane_w, palette.lane);

        if scenery && n.rem_euclid(BUILDING_EVERY) == 0 {
            let depth = ((n - base) as f32 / draw.max(1) as f32).clamp(0.0, 1.0);
            draw_scenery(out, n, Vec2::new(x2, y2), road2, depth, palette);
        }
    }
}

/// Low-poly buildings (and every other time, trees) flanking the road
fn draw_scenery(
    out: &mut Vec<Vertex>,
    n: i64,
    ground: Vec2,
    road_half: f32,
    depth: f32,
    palette: &Palette,
) {
    let fog = |c: Rgba| fog_blend(c, palette.fog, depth, SCENERY_FOG);
    let roll = Channel::Scenery.sample(n) as f32;

    let side = road_half * 1.25;
    let bw = road_half * 0.55;
    let bh = road_half * (0.19 + 0.18 * roll);
    let left = ground.x - side;
    let right = ground.x + side;
    let by = ground.y;

    shapes::polygon(
        out,
        &[
            Vec2::new(left - bw * 0.62, by),
            Vec2::new(left - bw * 0.12, by),
            Vec2::new(left - bw * 0.16, by - bh),
            Vec2::new(left - bw * 0.68, by - bh * 0.92),
        ],
        fog(palette.building[0]),
    );
    shapes::polygon(
        out,
        &[
            Vec2::new(right + bw * 0.12, by),
            Vec2::new(right + bw * 0.62, by),
            Vec2::new(right + bw * 0.68, by - bh * 0.92),
            Vec2::new(right + bw * 0.16, by - bh),
        ],
        fog(palette.building[1]),
    );

    if n.rem_euclid(TREE_EVERY) == 0 {
        let th = road_half * (0.10 + 0.055 * (roll * 7.0).fract());
        shapes::triangle(
            out,
            Vec2::new(left - bw * 0.95, by),
            Vec2::new(left - bw * 0.80, by),
            Vec2::new(left - bw * 0.88, by - th),
            fog(palette.tree[0]),
        );
        shapes::triangle(
            out,
            Vec2::new(right + bw * 0.80, by),
            Vec2::new(right + bw * 0.95, by),
            Vec2::new(right + bw * 0.88, by - th),
            fog(palette.tree[1]),
        );
    }
}

/// One coin or obstacle, already known to be in front of the camera
#[allow(clippy::too_many_arguments)]
fn draw_object(
    out: &mut Vec<Vertex>,
    obj: &WorldObject,
    camera: &Camera,
    palette: &Palette,
    viewport: Viewport,
    shake: Vec2,
    depth: f32,
    segments: u32,
) {
    let fog = |c: Rgba| fog_blend(c, palette.fog, depth, OBJECT_FOG);

    match obj.kind {
        ObjectKind::Coin => {
            let p = camera.project_road(obj.lateral, COIN_HOVER, obj.forward, viewport);
            let size = footprint(p.scale, COIN_RADIUS, COIN_CALIBRATION);
            if !viewport.contains_y(p.y, 80.0, 80.0) || !viewport.contains_x(p.x, size + 80.0) {
                return;
            }
            let center = Vec2::new(p.x, p.y) + shake;
            // Spin shows as a vertical squash
            let squash = obj.phase.cos().abs() * 0.85 + 0.15;
            let r = |k: f32| Vec2::new(size * k, size * k * squash);

            shapes::ellipse(out, center, r(0.68), palette.coin_glow, segments);
            shapes::ellipse(out, center, r(0.42), fog(palette.coin), segments);
            shapes::ellipse_ring(
                out,
                center,
                r(0.28),
                (size * 0.08).max(1.0),
                colors::INK,
                segments,
            );
        }
        ObjectKind::Obstacle(kind) => {
            let p = camera.project_road(obj.lateral, 0.0, obj.forward, viewport);
            let (fw, fh) = kind.footprint();
            let ww = footprint(p.scale, fw, OBSTACLE_CALIBRATION);
            let hh = footprint(p.scale, fh, OBSTACLE_CALIBRATION);
            if !viewport.contains_y(p.y, 80.0, 100.0) || !viewport.contains_x(p.x, ww + 80.0) {
                return;
            }
            let base = Vec2::new(p.x, p.y) + shake;
            let mark = out.len();

            match kind {
                ObstacleKind::Cone => {
                    shapes::triangle(
                        out,
                        base + Vec2::new(-ww * 0.5, 0.0),
                        base + Vec2::new(ww * 0.5, 0.0),
                        base + Vec2::new(0.0, -hh),
                        fog(palette.cone),
                    );
                    shapes::line(
                        out,
                        base + Vec2::new(-ww * 0.28, -hh * 0.35),
                        base + Vec2::new(ww * 0.28, -hh * 0.35),
                        (ww * 0.06).max(1.0),
                        colors::INK,
                    );
                }
                ObstacleKind::Block => {
                    let min = base + Vec2::new(-ww * 0.5, -hh);
                    let size = Vec2::new(ww, hh);
                    shapes::rect(out, min, size, fog(palette.block));
                    shapes::rect_outline(out, min, size, (ww * 0.05).max(1.0), colors::INK);
                    // Top bevel
                    shapes::rect(out, min, Vec2::new(ww, hh * 0.18), colors::BEVEL);
                }
            }

            if obj.spent {
                for v in &mut out[mark..] {
                    v.color[3] *= 0.65;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Coin, Obstacle};

    fn view() -> Viewport {
        Viewport::from_size(1280.0, 720.0)
    }

    fn running_sim() -> Simulation {
        let mut sim = Simulation::default();
        sim.camera = 2400.0;
        sim.run.distance = 2400.0;
        sim.advance_world();
        sim
    }

    fn render(sim: &Simulation, settings: &Settings, seed: u64) -> Frame {
        Renderer::new(seed).frame(sim, &Cosmetics::default(), settings, view())
    }

    #[test]
    fn test_frame_leaves_simulation_untouched() {
        let sim = running_sim();
        let before = serde_json::to_string(&sim).unwrap();
        let frame = render(&sim, &Settings::default(), 7);
        assert!(frame.triangle_count() > 0);
        assert_eq!(serde_json::to_string(&sim).unwrap(), before);
    }

    #[test]
    fn test_same_seed_same_frame() {
        let mut sim = running_sim();
        sim.player.shake = 6.0;
        let a = render(&sim, &Settings::default(), 42);
        let b = render(&sim, &Settings::default(), 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_shake_disabled_removes_jitter() {
        let mut sim = running_sim();
        sim.player.shake = 8.0;
        let settings = Settings {
            screen_shake: false,
            ..Settings::default()
        };
        assert_eq!(render(&sim, &settings, 1), render(&sim, &settings, 2));

        // With shake on, different seeds jitter differently
        let shaky = Settings::default();
        assert_ne!(render(&sim, &shaky, 1), render(&sim, &shaky, 2));
    }

    #[test]
    fn test_all_geometry_is_finite() {
        let mut sim = running_sim();
        sim.player.lateral = -1.3;
        sim.night = true;
        let frame = render(&sim, &Settings::default(), 3);
        assert_eq!(frame.vertices.len() % 3, 0);
        for v in &frame.vertices {
            assert!(v.position.iter().all(|c| c.is_finite()));
            assert!(v.color.iter().all(|c| (0.0..=1.0).contains(c)));
        }
        assert_eq!(frame.clear, Palette::NIGHT.sky_top);
    }

    #[test]
    fn test_objects_behind_camera_are_culled() {
        let mut sim = Simulation::default();
        sim.camera = 5000.0;
        let empty = render(&sim, &Settings::default(), 0).vertices.len();

        // Behind the camera and past the draw window: both invisible
        sim.world.obstacles.push(Obstacle {
            lateral: 0.0,
            forward: 4000.0,
            kind: ObstacleKind::Block,
            hit: false,
        });
        sim.world.coins.push(Coin {
            lateral: 0.0,
            forward: 5000.0 + 1.0e6,
            phase: 0.0,
            taken: false,
        });
        assert_eq!(render(&sim, &Settings::default(), 0).vertices.len(), empty);

        // Well ahead: drawn
        sim.world.obstacles.push(Obstacle {
            lateral: 0.3,
            forward: 9000.0,
            kind: ObstacleKind::Cone,
            hit: false,
        });
        assert!(render(&sim, &Settings::default(), 0).vertices.len() > empty);
    }

    #[test]
    fn test_objects_far_to_the_side_are_culled() {
        let mut sim = Simulation::default();
        sim.camera = 5000.0;
        let empty = render(&sim, &Settings::default(), 0).vertices.len();

        // Right depth and height for the screen, but way off to the side
        for lateral in [-40.0, 40.0] {
            sim.world.obstacles.push(Obstacle {
                lateral,
                forward: 9000.0,
                kind: ObstacleKind::Block,
                hit: false,
            });
            sim.world.coins.push(Coin {
                lateral,
                forward: 9000.0,
                phase: 0.0,
                taken: false,
            });
        }
        assert_eq!(render(&sim, &Settings::default(), 0).vertices.len(), empty);
    }

    #[test]
    fn test_popups_become_labels() {
        let mut sim = Simulation::default();
        sim.world
            .push_popup("+35", Vec2::new(0.5, 0.55), PopupTone::Gain);
        sim.world.popups[0].age = 0.5;
        let frame = render(&sim, &Settings::default(), 0);
        assert_eq!(frame.labels.len(), 1);
        let label = &frame.labels[0];
        assert_eq!(label.text, "+35");
        assert_eq!(label.position, Vec2::new(640.0, 0.55 * 720.0 - 13.0));
        assert_eq!(label.color[3], 0.5);
    }

    #[test]
    fn test_camera_follows_car_partially() {
        let mut sim = Simulation::default();
        sim.player.lateral = 1.0;
        let cam = Camera::follow(&sim);
        assert_eq!(cam.position.x, 1100.0 * CAMERA_FOLLOW);
        assert_eq!(cam.position.z, -CAMERA_TRAIL);
        // Straight road when the drift wave is at zero
        assert_eq!(cam.road_center(10_000.0), 0.0);
    }

    #[test]
    fn test_road_narrows_with_distance() {
        let sim = running_sim();
        let cam = Camera::follow(&sim);
        let near = cam.project_road(0.0, 0.0, sim.camera + 200.0, view());
        let far = cam.project_road(0.0, 0.0, sim.camera + 20_000.0, view());
        assert!(cam.half_width_px(near.scale) > cam.half_width_px(far.scale));
        assert!(near.y > far.y, "near ground is lower on screen");
    }

    #[test]
    fn test_low_quality_draws_less() {
        let sim = running_sim();
        let low = render(&sim, &Settings::from_preset(crate::QualityPreset::Low), 0);
        let high = render(&sim, &Settings::from_preset(crate::QualityPreset::High), 0);
        assert!(low.vertices.len() < high.vertices.len());
    }
}
