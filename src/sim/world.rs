//! Procedural world generation
//!
//! The road is endless but the world is not stored: each segment's content is
//! a pure function of its index (via the spatial hash), so the generator only
//! keeps the rolling window of live objects around the camera plus a
//! watermark of the last populated segment.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::hash::Channel;
use crate::tuning::{SpawnTuning, Tuning};

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Cone,
    Block,
}

impl ObstacleKind {
    /// World-space (width, height)
    pub const fn footprint(self) -> (f32, f32) {
        match self {
            ObstacleKind::Cone => (40.0, 58.0),
            ObstacleKind::Block => (80.0, 50.0),
        }
    }
}

/// What a world object is, for the few places where that matters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Coin,
    Obstacle(ObstacleKind),
}

/// Coin radius in world units
pub const COIN_RADIUS: f32 = 26.0;

/// A collectable coin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    /// Road-relative lateral offset
    pub lateral: f32,
    /// Forward position along the track
    pub forward: f32,
    /// Spin phase (radians, cosmetic)
    pub phase: f32,
    pub taken: bool,
}

/// A cone or block on the road
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub lateral: f32,
    pub forward: f32,
    pub kind: ObstacleKind,
    /// Set on first contact; hit obstacles stay until pruned but never penalize again
    pub hit: bool,
}

/// Read-only view of any live object
#[derive(Debug, Clone, Copy)]
pub struct WorldObject {
    pub kind: ObjectKind,
    pub lateral: f32,
    pub forward: f32,
    pub phase: f32,
    /// Taken coin or hit obstacle
    pub spent: bool,
}

/// Popup colour family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopupTone {
    Gain,
    Loss,
}

/// Floating score text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePopup {
    pub text: String,
    /// Anchor in normalized screen space (0..1, y down)
    pub anchor: Vec2,
    pub tone: PopupTone,
    /// 0 when spawned, removed at 1
    pub age: f32,
}

/// The rolling window of live world content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    pub coins: Vec<Coin>,
    pub obstacles: Vec<Obstacle>,
    pub popups: Vec<ScorePopup>,
    /// First segment index not yet populated
    populated_until: Option<i64>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every object, popup and the population watermark
    pub fn clear(&mut self) {
        self.coins.clear();
        self.obstacles.clear();
        self.popups.clear();
        self.populated_until = None;
    }

    /// Upper bound on live coins + obstacles for a window size
    pub fn capacity_bound(draw_distance: i32, keep_behind: i32) -> usize {
        // One coin and one obstacle per segment, plus the segment straddling the camera
        2 * (draw_distance.max(0) + keep_behind.max(0) + 2) as usize
    }

    /// Iterate every live coin and obstacle
    pub fn objects(&self) -> impl Iterator<Item = WorldObject> + '_ {
        let coins = self.coins.iter().map(|c| WorldObject {
            kind: ObjectKind::Coin,
            lateral: c.lateral,
            forward: c.forward,
            phase: c.phase,
            spent: c.taken,
        });
        let obstacles = self.obstacles.iter().map(|o| WorldObject {
            kind: ObjectKind::Obstacle(o.kind),
            lateral: o.lateral,
            forward: o.forward,
            phase: 0.0,
            spent: o.hit,
        });
        coins.chain(obstacles)
    }

    pub fn push_popup(&mut self, text: impl Into<String>, anchor: Vec2, tone: PopupTone) {
        self.popups.push(ScorePopup {
            text: text.into(),
            anchor,
            tone,
            age: 0.0,
        });
    }

    /// Spawn content ahead of the camera and prune what fell behind.
    ///
    /// Never fails: a non-positive segment length, a non-finite camera
    /// distance or a negative draw distance simply generate nothing.
    pub fn advance(
        &mut self,
        camera_distance: f32,
        segment_length: f32,
        draw_distance: i32,
        tuning: &Tuning,
    ) {
        self.popups.retain(|p| p.age < 1.0);

        if !(segment_length > 0.0) || !camera_distance.is_finite() {
            return;
        }

        let behind = camera_distance - segment_length * tuning.road.keep_behind as f32;
        self.coins.retain(|c| c.forward > behind);
        self.obstacles.retain(|o| o.forward > behind);

        if draw_distance <= 0 {
            return;
        }

        let cam_seg = (camera_distance / segment_length).floor() as i64;
        let ahead = cam_seg + draw_distance as i64;
        let start = self.populated_until.map_or(cam_seg, |done| done.max(cam_seg));

        for segment in start..ahead {
            self.populate(segment, segment_length, &tuning.spawn);
        }

        if start < ahead {
            log::trace!(
                "populated segments {}..{} ({} coins, {} obstacles live)",
                start,
                ahead,
                self.coins.len(),
                self.obstacles.len()
            );
        }
        self.populated_until = Some(self.populated_until.map_or(ahead, |done| done.max(ahead)));
    }

    /// Roll the spawn channels for one segment
    fn populate(&mut self, segment: i64, segment_length: f32, rules: &SpawnTuning) {
        let segment_end = (segment + 1) as f64 * segment_length as f64;

        if Channel::CoinGate.sample(segment) < rules.coin_chance {
            let lane = side(Channel::CoinLane.sample(segment)) * rules.coin_lane;
            let spread = (Channel::CoinSpread.sample(segment) as f32 - 0.5) * rules.coin_spread;
            let forward = segment_end + jitter(Channel::CoinOffset.sample(segment), rules.coin_offset);
            let forward = forward as f32;

            if !self
                .coins
                .iter()
                .any(|c| (c.forward - forward).abs() < rules.coin_spacing)
            {
                self.coins.push(Coin {
                    lateral: (lane + spread).clamp(-rules.coin_max_lateral, rules.coin_max_lateral),
                    forward,
                    phase: Channel::CoinPhase.sample(segment) as f32 * std::f32::consts::TAU,
                    taken: false,
                });
            }
        }

        if Channel::ObstacleGate.sample(segment) < rules.obstacle_chance {
            let lane = side(Channel::ObstacleLane.sample(segment)) * rules.obstacle_lane;
            let spread =
                (Channel::ObstacleSpread.sample(segment) as f32 - 0.5) * rules.obstacle_spread;
            let forward =
                segment_end + jitter(Channel::ObstacleOffset.sample(segment), rules.obstacle_offset);
            let forward = forward as f32;

            if !self
                .obstacles
                .iter()
                .any(|o| (o.forward - forward).abs() < rules.obstacle_spacing)
            {
                let kind = if Channel::ObstacleKind.sample(segment) < rules.cone_chance {
                    ObstacleKind::Cone
                } else {
                    ObstacleKind::Block
                };
                self.obstacles.push(Obstacle {
                    lateral: (lane + spread)
                        .clamp(-rules.obstacle_max_lateral, rules.obstacle_max_lateral),
                    forward,
                    kind,
                    hit: false,
                });
            }
        }
    }
}

/// Left (-1) or right (+1) from a hash roll
#[inline]
fn side(roll: f64) -> f32 {
    if roll < 0.5 { -1.0 } else { 1.0 }
}

/// Map a hash roll into a (min, max) window
#[inline]
fn jitter(roll: f64, (lo, hi): (f32, f32)) -> f64 {
    lo as f64 + roll * (hi - lo) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn advance_to(world: &mut World, camera: f32, tuning: &Tuning) {
        world.advance(
            camera,
            tuning.road.segment_length,
            tuning.road.draw_distance,
            tuning,
        );
    }

    fn assert_spacing(world: &World, tuning: &Tuning) {
        for (i, a) in world.coins.iter().enumerate() {
            for b in &world.coins[i + 1..] {
                assert!((a.forward - b.forward).abs() >= tuning.spawn.coin_spacing);
            }
        }
        for (i, a) in world.obstacles.iter().enumerate() {
            for b in &world.obstacles[i + 1..] {
                assert!((a.forward - b.forward).abs() >= tuning.spawn.obstacle_spacing);
            }
        }
    }

    #[test]
    fn test_advance_spawns_ahead_only() {
        let tuning = Tuning::default();
        let mut world = World::new();
        advance_to(&mut world, 0.0, &tuning);

        assert!(!world.coins.is_empty(), "220 segments at 8% should hold coins");
        assert!(!world.obstacles.is_empty());
        let horizon = (tuning.road.draw_distance + 1) as f32 * tuning.road.segment_length + 140.0;
        for obj in world.objects() {
            assert!(obj.forward > 0.0 && obj.forward < horizon);
            assert!(!obj.spent);
        }
    }

    #[test]
    fn test_two_generators_agree() {
        let tuning = Tuning::default();
        let mut a = World::new();
        let mut b = World::new();
        for step in 0..50 {
            let cam = step as f32 * 333.0;
            advance_to(&mut a, cam, &tuning);
            advance_to(&mut b, cam, &tuning);
        }
        assert_eq!(a.coins.len(), b.coins.len());
        assert_eq!(a.obstacles.len(), b.obstacles.len());
        for (x, y) in a.coins.iter().zip(&b.coins) {
            assert_eq!(x.forward, y.forward);
            assert_eq!(x.lateral, y.lateral);
        }
        for (x, y) in a.obstacles.iter().zip(&b.obstacles) {
            assert_eq!(x.kind, y.kind);
            assert_eq!(x.forward, y.forward);
        }
    }

    #[test]
    fn test_repeated_advance_does_not_duplicate() {
        let tuning = Tuning::default();
        let mut world = World::new();
        advance_to(&mut world, 1000.0, &tuning);
        let coins = world.coins.len();
        let obstacles = world.obstacles.len();
        advance_to(&mut world, 1000.0, &tuning);
        advance_to(&mut world, 1000.0, &tuning);
        assert_eq!(world.coins.len(), coins);
        assert_eq!(world.obstacles.len(), obstacles);
    }

    #[test]
    fn test_taken_coin_does_not_respawn() {
        let tuning = Tuning::default();
        let mut world = World::new();
        advance_to(&mut world, 0.0, &tuning);
        let removed = world.coins.remove(0);
        advance_to(&mut world, 0.0, &tuning);
        assert!(world.coins.iter().all(|c| c.forward != removed.forward));
    }

    #[test]
    fn test_prunes_behind_camera() {
        let tuning = Tuning::default();
        let mut world = World::new();
        advance_to(&mut world, 0.0, &tuning);
        let cam = 20_000.0;
        advance_to(&mut world, cam, &tuning);
        let behind = cam - tuning.road.segment_length * tuning.road.keep_behind as f32;
        assert!(world.objects().all(|o| o.forward > behind));
    }

    #[test]
    fn test_lateral_stays_in_safe_range() {
        let tuning = Tuning::default();
        let mut world = World::new();
        advance_to(&mut world, 0.0, &tuning);
        for c in &world.coins {
            assert!(c.lateral.abs() <= tuning.spawn.coin_max_lateral);
        }
        for o in &world.obstacles {
            assert!(o.lateral.abs() <= tuning.spawn.obstacle_max_lateral);
        }
    }

    #[test]
    fn test_degenerate_config_generates_nothing() {
        let tuning = Tuning::default();
        let mut world = World::new();
        world.advance(0.0, 160.0, -5, &tuning);
        assert_eq!(world.objects().count(), 0);
        world.advance(0.0, 0.0, 220, &tuning);
        assert_eq!(world.objects().count(), 0);
        world.advance(f32::NAN, 160.0, 220, &tuning);
        assert_eq!(world.objects().count(), 0);
    }

    #[test]
    fn test_expired_popups_are_pruned() {
        let tuning = Tuning::default();
        let mut world = World::new();
        world.push_popup("+35", Vec2::new(0.5, 0.55), PopupTone::Gain);
        world.push_popup("-60", Vec2::new(0.5, 0.57), PopupTone::Loss);
        world.popups[0].age = 1.0;
        world.popups[1].age = 0.4;
        advance_to(&mut world, 0.0, &tuning);
        assert_eq!(world.popups.len(), 1);
        assert_eq!(world.popups[0].text, "-60");
    }

    #[test]
    fn test_clear_resets_watermark() {
        let tuning = Tuning::default();
        let mut world = World::new();
        advance_to(&mut world, 0.0, &tuning);
        let first = world.coins.len();
        world.clear();
        assert_eq!(world.objects().count(), 0);
        advance_to(&mut world, 0.0, &tuning);
        assert_eq!(world.coins.len(), first);
    }

    proptest! {
        #[test]
        fn prop_memory_is_bounded(steps in proptest::collection::vec(0.0f32..5000.0, 1..60)) {
            let tuning = Tuning::default();
            let bound = World::capacity_bound(tuning.road.draw_distance, tuning.road.keep_behind);
            let mut world = World::new();
            let mut cam = 0.0;
            for step in steps {
                cam += step;
                advance_to(&mut world, cam, &tuning);
                prop_assert!(world.coins.len() + world.obstacles.len() <= bound);
            }
        }

        #[test]
        fn prop_spacing_invariant(start in 0.0f32..1.0e6, stride in 1.0f32..2000.0) {
            let tuning = Tuning::default();
            let mut world = World::new();
            for k in 0..20 {
                advance_to(&mut world, start + k as f32 * stride, &tuning);
                assert_spacing(&world, &tuning);
            }
        }
    }
}
