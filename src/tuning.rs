//! Data-driven game balance
//!
//! Every number that shapes a run lives here. All sections default to the
//! shipped balance, so a JSON override only needs the fields it changes:
//!
//! ```json
//! { "drive": { "max_speed": 900.0 }, "spawn": { "coin_chance": 0.12 } }
//! ```

use serde::{Deserialize, Serialize};

use crate::sim::ObjectKind;

/// Road geometry and generation window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadTuning {
    /// Full road width in world units (lateral ±1.0 maps to ±width/2)
    pub width: f32,
    /// Length of one generation segment
    pub segment_length: f32,
    /// Segments generated ahead of the camera
    pub draw_distance: i32,
    /// Segments kept behind the camera before pruning
    pub keep_behind: i32,
}

impl Default for RoadTuning {
    fn default() -> Self {
        Self {
            width: 2200.0,
            segment_length: 160.0,
            draw_distance: 220,
            keep_behind: 10,
        }
    }
}

impl RoadTuning {
    /// Half the road width: the world distance of lateral offset 1.0
    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }
}

/// Steering and speed model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveTuning {
    /// Speed at run start and after a reset (world units/s)
    pub base_speed: f32,
    /// Cruise speed ceiling
    pub max_speed: f32,
    /// Cruise target gained per world unit travelled
    pub speed_per_distance: f32,
    /// Fraction of the speed gap left after one second
    pub speed_decay: f32,
    /// Fraction of the steering gap left after one second
    pub steer_decay: f32,
    /// Lateral offset per second at full steer
    pub lateral_gain: f32,
    /// Hard clamp on lateral offset (wider than the off-road bound)
    pub steer_clamp: f32,
    /// Shake magnitude at full speed
    pub max_shake: f32,
}

impl Default for DriveTuning {
    fn default() -> Self {
        Self {
            base_speed: 220.0,
            max_speed: 720.0,
            speed_per_distance: 0.06,
            speed_decay: 0.001,
            steer_decay: 0.0001,
            lateral_gain: 1.15,
            steer_clamp: 1.35,
            max_shake: 10.0,
        }
    }
}

impl DriveTuning {
    /// Cruise speed the car is accelerating toward at `distance`
    pub fn target_speed(&self, distance: f32) -> f32 {
        (self.base_speed + distance * self.speed_per_distance).clamp(self.base_speed, self.max_speed)
    }
}

/// Procedural spawn rules (see `sim::world`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Per-segment coin probability
    pub coin_chance: f64,
    /// Lane centre for coins (mirrored left/right)
    pub coin_lane: f32,
    /// Total lateral jitter range around the lane
    pub coin_spread: f32,
    /// Coins never spawn beyond this lateral offset
    pub coin_max_lateral: f32,
    /// Forward jitter window past the segment end
    pub coin_offset: (f32, f32),
    /// Minimum forward gap between two coins
    pub coin_spacing: f32,

    /// Per-segment obstacle probability
    pub obstacle_chance: f64,
    pub obstacle_lane: f32,
    pub obstacle_spread: f32,
    pub obstacle_max_lateral: f32,
    pub obstacle_offset: (f32, f32),
    pub obstacle_spacing: f32,
    /// Probability an obstacle is a cone rather than a block
    pub cone_chance: f64,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            coin_chance: 0.08,
            coin_lane: 0.5,
            coin_spread: 0.2,
            coin_max_lateral: 0.75,
            coin_offset: (20.0, 120.0),
            coin_spacing: 40.0,

            obstacle_chance: 0.055,
            obstacle_lane: 0.55,
            obstacle_spread: 0.25,
            obstacle_max_lateral: 0.8,
            obstacle_offset: (30.0, 140.0),
            obstacle_spacing: 80.0,
            cone_chance: 0.5,
        }
    }
}

/// Hitbox and scoring rules (see `sim::collision`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    /// Player hitbox sits this far ahead of the camera
    pub player_lead: f32,
    pub coin_reach: (f32, f32),
    pub obstacle_reach: (f32, f32),
    /// Score for a coin
    pub coin_reward: f32,
    /// Score lost on an obstacle hit (total never drops below zero)
    pub obstacle_penalty: f32,
    /// Speed multiplier on an obstacle hit
    pub hit_speed_factor: f32,
    /// Speed never drops below this on an obstacle hit
    pub hit_speed_floor: f32,
    /// |lateral| beyond this resets the run
    pub off_road: f32,
    /// Continuous score per world unit travelled
    pub distance_score: f32,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            player_lead: 380.0,
            coin_reach: (120.0, 0.22),
            obstacle_reach: (140.0, 0.25),
            coin_reward: 35.0,
            obstacle_penalty: 60.0,
            hit_speed_factor: 0.65,
            hit_speed_floor: 120.0,
            off_road: 1.05,
            distance_score: 0.02,
        }
    }
}

impl ScoringTuning {
    /// Forward and lateral reach of the hitbox against one kind of object
    pub fn reach(&self, kind: ObjectKind) -> (f32, f32) {
        match kind {
            ObjectKind::Coin => self.coin_reach,
            ObjectKind::Obstacle(_) => self.obstacle_reach,
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub road: RoadTuning,
    pub drive: DriveTuning,
    pub spawn: SpawnTuning,
    pub scoring: ScoringTuning,
}

impl Tuning {
    /// Parse a (possibly partial) JSON override and sanitize it
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Clamp out-of-range values to safe bounds instead of failing
    pub fn sanitized(mut self) -> Self {
        let road = &mut self.road;
        if !(road.segment_length.is_finite() && road.segment_length >= 1.0) {
            log::warn!("segment_length {} out of range, using 1.0", road.segment_length);
            road.segment_length = 1.0;
        }
        if !(road.width.is_finite() && road.width > 0.0) {
            log::warn!("road width {} out of range, using default", road.width);
            road.width = RoadTuning::default().width;
        }
        road.draw_distance = road.draw_distance.clamp(0, 2000);
        road.keep_behind = road.keep_behind.clamp(1, 100);

        let drive = &mut self.drive;
        drive.base_speed = drive.base_speed.max(0.0);
        if drive.max_speed < drive.base_speed {
            log::warn!(
                "max_speed {} below base_speed {}, raising it",
                drive.max_speed,
                drive.base_speed
            );
            drive.max_speed = drive.base_speed;
        }
        drive.speed_decay = drive.speed_decay.clamp(1e-9, 1.0);
        drive.steer_decay = drive.steer_decay.clamp(1e-9, 1.0);
        if !(drive.steer_clamp.is_finite() && drive.steer_clamp >= 0.1) {
            let fallback = DriveTuning::default().steer_clamp;
            log::warn!("steer_clamp {} out of range, using {fallback}", drive.steer_clamp);
            drive.steer_clamp = fallback;
        }
        if !(drive.lateral_gain.is_finite() && drive.lateral_gain >= 0.0) {
            let fallback = DriveTuning::default().lateral_gain;
            log::warn!("lateral_gain {} out of range, using {fallback}", drive.lateral_gain);
            drive.lateral_gain = fallback;
        }

        let scoring = &mut self.scoring;
        // Off-road must be reachable and away from the centre line, so it
        // sits strictly between zero and the steering clamp
        if !(scoring.off_road > 0.0 && scoring.off_road < self.drive.steer_clamp) {
            let bound = self.drive.steer_clamp * 0.95;
            log::warn!(
                "off_road {} not inside (0, steer_clamp {}), using {}",
                scoring.off_road,
                self.drive.steer_clamp,
                bound
            );
            scoring.off_road = bound;
        }
        scoring.hit_speed_factor = scoring.hit_speed_factor.clamp(0.0, 1.0);
        scoring.coin_reward = scoring.coin_reward.max(0.0);
        scoring.obstacle_penalty = scoring.obstacle_penalty.max(0.0);

        let spawn = &mut self.spawn;
        spawn.coin_chance = spawn.coin_chance.clamp(0.0, 1.0);
        spawn.obstacle_chance = spawn.obstacle_chance.clamp(0.0, 1.0);
        spawn.cone_chance = spawn.cone_chance.clamp(0.0, 1.0);
        spawn.coin_spacing = spawn.coin_spacing.max(0.0);
        spawn.obstacle_spacing = spawn.obstacle_spacing.max(0.0);

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipped_balance() {
        let t = Tuning::default();
        assert_eq!(t.road.segment_length, 160.0);
        assert_eq!(t.road.draw_distance, 220);
        assert_eq!(t.scoring.coin_reward, 35.0);
        assert!(t.scoring.off_road < t.drive.steer_clamp);
    }

    #[test]
    fn test_partial_json_override() {
        let t = Tuning::from_json(r#"{ "drive": { "max_speed": 900.0 } }"#).unwrap();
        assert_eq!(t.drive.max_speed, 900.0);
        // Untouched fields keep their defaults
        assert_eq!(t.drive.base_speed, 220.0);
        assert_eq!(t.spawn.coin_chance, 0.08);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_sanitize_clamps_out_of_range_values() {
        let t = Tuning::from_json(
            r#"{
                "road": { "segment_length": -5.0, "draw_distance": -20 },
                "drive": { "base_speed": 500.0, "max_speed": 100.0 },
                "scoring": { "off_road": 2.0 }
            }"#,
        )
        .unwrap();
        assert_eq!(t.road.segment_length, 1.0);
        assert_eq!(t.road.draw_distance, 0);
        assert_eq!(t.drive.max_speed, 500.0);
        assert!(t.scoring.off_road < t.drive.steer_clamp);
    }

    #[test]
    fn test_sanitize_keeps_off_road_away_from_centre() {
        for off_road in [-1.0, 0.0, f32::NAN] {
            let mut t = Tuning::default();
            t.scoring.off_road = off_road;
            let t = t.sanitized();
            assert!(t.scoring.off_road > 0.0, "{off_road} -> {}", t.scoring.off_road);
            assert!(t.scoring.off_road < t.drive.steer_clamp);
        }

        // Straight driving must never trip the reset
        let t = Tuning::from_json(r#"{ "scoring": { "off_road": -1.0 } }"#).unwrap();
        let mut sim = crate::sim::Simulation::new(t);
        sim.advance_world();
        let mut resets = 0;
        for _ in 0..60 {
            let report = crate::sim::update(
                &mut sim,
                &crate::sim::TickInput::default(),
                1.0 / 60.0,
                &mut crate::Profile::new(),
            );
            resets += report.reset as u32;
        }
        assert_eq!(resets, 0);
        assert!(sim.camera > 0.0);
    }

    #[test]
    fn test_sanitize_rejects_non_finite_steering() {
        let mut t = Tuning::default();
        t.drive.steer_clamp = f32::INFINITY;
        t.drive.lateral_gain = f32::NAN;
        let t = t.sanitized();
        assert_eq!(t.drive.steer_clamp, 1.35);
        assert_eq!(t.drive.lateral_gain, 1.15);
        assert!(t.scoring.off_road < t.drive.steer_clamp);
    }

    #[test]
    fn test_target_speed_is_bounded() {
        let d = DriveTuning::default();
        assert_eq!(d.target_speed(0.0), 220.0);
        assert_eq!(d.target_speed(1000.0), 280.0);
        assert_eq!(d.target_speed(1.0e9), 720.0);
    }
}
