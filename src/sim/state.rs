//! Simulation state
//!
//! One explicit context object owns everything a frame mutates. The run
//! controller holds it and lends it to the update step, generator and
//! resolver; the renderer only ever sees `&Simulation`.

use serde::{Deserialize, Serialize};

use super::world::World;
use crate::consts::*;
use crate::tuning::Tuning;
use crate::unit_range;

/// Something the audio/UX layer may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    /// Run ended by the player; carries the coins banked
    RunStopped { banked: u32 },
    CoinPickup,
    ObstacleHit,
    /// Off-road reset; carries the coins banked
    RunReset { banked: u32 },
}

/// The Save collaborator: receives the run's coins at run boundaries.
///
/// Implementations must not fail loudly; a failed write is their problem and
/// the run carries on as if the coins were banked.
pub trait SaveSink {
    fn bank_coins(&mut self, coins: u32);
}

/// The player's car
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerState {
    /// Road-relative lateral offset (0 = centre, ±1 = road edge)
    pub lateral: f32,
    /// Smoothed steering (-1..1)
    pub steer: f32,
    /// Forward speed (world units/s)
    pub speed: f32,
    /// Camera shake magnitude (cosmetic)
    pub shake: f32,
}

/// Per-run counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub score: f32,
    /// Coins collected this run (banked on stop/reset)
    pub coins: u32,
    /// Total distance travelled this run
    pub distance: f32,
}

/// Complete simulation context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    pub tuning: Tuning,
    pub player: PlayerState,
    /// Camera forward position along the track
    pub camera: f32,
    pub run: RunStats,
    pub world: World,
    /// Night palette
    pub night: bool,
    /// Events raised since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

impl Simulation {
    /// A fresh, empty simulation (no world content until the first advance)
    pub fn new(tuning: Tuning) -> Self {
        let mut sim = Self {
            tuning,
            player: PlayerState::default(),
            camera: 0.0,
            run: RunStats::default(),
            world: World::new(),
            night: false,
            events: Vec::new(),
        };
        sim.reset_run_state();
        sim
    }

    /// Put the car back at the start line and forget this run's content
    pub fn reset_run_state(&mut self) {
        self.player = PlayerState {
            speed: self.tuning.drive.base_speed,
            ..PlayerState::default()
        };
        self.camera = 0.0;
        self.run = RunStats::default();
        self.world.clear();
    }

    /// Generate the world window around the current camera position
    pub fn advance_world(&mut self) {
        let road = &self.tuning.road;
        self.world
            .advance(self.camera, road.segment_length, road.draw_distance, &self.tuning);
    }

    /// Bank the run's coins and restart in place (off-road)
    pub fn reset_run(&mut self, save: &mut dyn SaveSink) {
        let banked = self.bank(save);
        log::info!(
            "Run reset: score {}, distance {:.0}, banked {} coins",
            self.display_score(),
            self.run.distance,
            banked
        );
        self.reset_run_state();
        // Regenerate right away so the road never appears empty
        self.advance_world();
        self.events.push(GameEvent::RunReset { banked });
    }

    /// Hand this run's coins to the Save collaborator
    pub fn bank(&mut self, save: &mut dyn SaveSink) -> u32 {
        let coins = std::mem::take(&mut self.run.coins);
        if coins > 0 {
            save.bank_coins(coins);
        }
        coins
    }

    /// Forward position of the player's hitbox
    pub fn player_forward(&self) -> f32 {
        self.camera + self.tuning.scoring.player_lead
    }

    /// Current segment index under the camera
    pub fn camera_segment(&self) -> i64 {
        (self.camera / self.tuning.road.segment_length).floor() as i64
    }

    /// Speed as a 0..1 fraction of the effect range (shake, streaks)
    pub fn speed_fx(&self) -> f32 {
        unit_range(self.player.speed, FX_SPEED_FLOOR, self.tuning.drive.max_speed)
    }

    /// Score as shown on the HUD
    pub fn display_score(&self) -> u64 {
        self.run.score.max(0.0).floor() as u64
    }

    /// Speedometer reading
    pub fn display_speed(&self) -> u32 {
        (self.player.speed * KMH_PER_UNIT).max(0.0).floor() as u32
    }

    /// Speed gauge fill (0..1)
    pub fn speed_gauge(&self) -> f32 {
        unit_range(self.player.speed, GAUGE_SPEED_FLOOR, self.tuning.drive.max_speed)
    }

    /// Take every event raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Ledger(Vec<u32>);

    impl SaveSink for Ledger {
        fn bank_coins(&mut self, coins: u32) {
            self.0.push(coins);
        }
    }

    #[test]
    fn test_new_simulation_starts_at_base_speed() {
        let sim = Simulation::default();
        assert_eq!(sim.player.speed, 220.0);
        assert_eq!(sim.camera, 0.0);
        assert_eq!(sim.world.objects().count(), 0);
    }

    #[test]
    fn test_reset_run_banks_and_regenerates() {
        let mut sim = Simulation::default();
        sim.camera = 5000.0;
        sim.run = RunStats {
            score: 400.0,
            coins: 7,
            distance: 5000.0,
        };
        sim.player.lateral = 1.2;

        let mut ledger = Ledger::default();
        sim.reset_run(&mut ledger);

        assert_eq!(ledger.0, vec![7]);
        assert_eq!(sim.run.score, 0.0);
        assert_eq!(sim.run.coins, 0);
        assert_eq!(sim.camera, 0.0);
        assert_eq!(sim.player.lateral, 0.0);
        assert!(sim.world.objects().count() > 0, "world regenerated");
        assert_eq!(sim.drain_events(), vec![GameEvent::RunReset { banked: 7 }]);
        assert!(sim.events.is_empty());
    }

    #[test]
    fn test_bank_skips_empty_runs() {
        let mut sim = Simulation::default();
        let mut ledger = Ledger::default();
        assert_eq!(sim.bank(&mut ledger), 0);
        assert!(ledger.0.is_empty());
    }

    #[test]
    fn test_hud_readouts() {
        let mut sim = Simulation::default();
        sim.run.score = 41.9;
        sim.player.speed = 720.0;
        assert_eq!(sim.display_score(), 41);
        assert_eq!(sim.display_speed(), 100);
        assert_eq!(sim.speed_gauge(), 1.0);
        assert_eq!(sim.speed_fx(), 1.0);
        sim.player.speed = 160.0;
        assert_eq!(sim.speed_gauge(), 0.0);
    }
}
