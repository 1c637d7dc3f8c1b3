//! Run lifecycle
//!
//! The only entry point the frame driver talks to. A run is Idle until
//! started; while Running, each `tick` drives the update step. Off-road
//! resets happen inside the update step and keep the run Running.

use serde::{Deserialize, Serialize};

use super::collision::CollisionReport;
use super::state::{GameEvent, SaveSink, Simulation};
use super::tick::{TickInput, update};
use crate::tuning::Tuning;

/// Whether a run is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
}

/// Owns the simulation and gates the update step on the run phase
#[derive(Debug, Clone, Default)]
pub struct RunController {
    phase: RunPhase,
    sim: Simulation,
    /// Balance waiting for the next `start`
    pending_tuning: Option<Tuning>,
}

impl RunController {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            phase: RunPhase::Idle,
            sim: Simulation::new(tuning.sanitized()),
            pending_tuning: None,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    /// Read-only view for the renderer and HUD
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Begin a fresh run from the start line. No-op if already running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        if let Some(tuning) = self.pending_tuning.take() {
            self.sim.tuning = tuning;
        }
        self.sim.reset_run_state();
        self.sim.advance_world();
        self.phase = RunPhase::Running;
        self.sim.events.push(GameEvent::RunStarted);
        log::info!(
            "Run started ({} coins, {} obstacles ahead)",
            self.sim.world.coins.len(),
            self.sim.world.obstacles.len()
        );
    }

    /// End the run, banking its coins. Returns the number banked.
    pub fn stop(&mut self, save: &mut dyn SaveSink) -> u32 {
        if !self.is_running() {
            return 0;
        }
        let score = self.sim.display_score();
        let banked = self.sim.bank(save);
        self.sim.world.clear();
        self.phase = RunPhase::Idle;
        self.sim.events.push(GameEvent::RunStopped { banked });
        log::info!("Run stopped: score {score}, banked {banked} coins");
        banked
    }

    /// Advance one frame. Idle runs don't move.
    pub fn tick(&mut self, dt: f32, input: &TickInput, save: &mut dyn SaveSink) -> CollisionReport {
        match self.phase {
            RunPhase::Idle => CollisionReport::default(),
            RunPhase::Running => update(&mut self.sim, input, dt, save),
        }
    }

    pub fn set_night_mode(&mut self, night: bool) {
        self.sim.night = night;
    }

    /// Flip day/night and return the new state
    pub fn toggle_night(&mut self) -> bool {
        self.sim.night = !self.sim.night;
        self.sim.night
    }

    /// Swap in new balance. A run in progress keeps its tuning; the new
    /// values apply from the next `start`.
    pub fn set_tuning(&mut self, tuning: Tuning) {
        let tuning = tuning.sanitized();
        if self.is_running() {
            log::info!("Tuning changed mid-run; applying to the next run");
            self.pending_tuning = Some(tuning);
        } else {
            self.pending_tuning = None;
            self.sim.tuning = tuning;
        }
    }

    /// Every event raised since the last call, oldest first
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.sim.drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tick::Steer;

    #[derive(Default)]
    struct Ledger(u32);

    impl SaveSink for Ledger {
        fn bank_coins(&mut self, coins: u32) {
            self.0 += coins;
        }
    }

    const FRAME: f32 = 1.0 / 60.0;

    #[test]
    fn test_starts_idle_and_does_not_move() {
        let mut run = RunController::default();
        assert_eq!(run.phase(), RunPhase::Idle);
        run.tick(FRAME, &TickInput::default(), &mut Ledger::default());
        assert_eq!(run.simulation().camera, 0.0);
        assert_eq!(run.simulation().world.objects().count(), 0);
    }

    #[test]
    fn test_start_spawns_world_ahead() {
        let mut run = RunController::default();
        run.start();
        assert!(run.is_running());
        assert!(run.simulation().world.objects().count() > 0);
        assert_eq!(run.take_events(), vec![GameEvent::RunStarted]);

        // Starting twice is harmless
        run.start();
        assert!(run.take_events().is_empty());
    }

    #[test]
    fn test_tick_advances_while_running() {
        let mut run = RunController::default();
        run.start();
        for _ in 0..30 {
            run.tick(FRAME, &TickInput::default(), &mut Ledger::default());
        }
        assert!(run.simulation().camera > 0.0);
        assert!(run.simulation().run.score > 0.0);
    }

    #[test]
    fn test_stop_banks_and_goes_idle() {
        let mut run = RunController::default();
        let mut ledger = Ledger::default();
        run.start();
        run.sim.run.coins = 4;
        assert_eq!(run.stop(&mut ledger), 4);
        assert_eq!(ledger.0, 4);
        assert_eq!(run.phase(), RunPhase::Idle);
        assert_eq!(run.simulation().world.objects().count(), 0);
        assert_eq!(
            run.take_events(),
            vec![GameEvent::RunStarted, GameEvent::RunStopped { banked: 4 }]
        );

        // Stopping an idle run banks nothing
        assert_eq!(run.stop(&mut ledger), 0);
        assert_eq!(ledger.0, 4);
    }

    #[test]
    fn test_restart_begins_at_start_line() {
        let mut run = RunController::default();
        run.start();
        for _ in 0..120 {
            run.tick(FRAME, &TickInput::default(), &mut Ledger::default());
        }
        run.stop(&mut Ledger::default());
        run.start();
        assert_eq!(run.simulation().camera, 0.0);
        assert_eq!(run.simulation().run.distance, 0.0);
        assert_eq!(run.simulation().player.speed, 220.0);
    }

    #[test]
    fn test_off_road_reset_keeps_running() {
        let mut run = RunController::default();
        run.start();
        let right = TickInput {
            steer: Steer::Right,
        };
        let mut reset = false;
        for _ in 0..600 {
            if run.tick(FRAME, &right, &mut Ledger::default()).reset {
                reset = true;
                break;
            }
        }
        assert!(reset);
        assert!(run.is_running());
        assert!(
            run.take_events()
                .iter()
                .any(|e| matches!(e, GameEvent::RunReset { .. }))
        );
    }

    #[test]
    fn test_night_mode() {
        let mut run = RunController::default();
        run.set_night_mode(true);
        assert!(run.simulation().night);
        assert!(!run.toggle_night());
        assert!(!run.simulation().night);
        // Survives a new run
        run.toggle_night();
        run.start();
        assert!(run.simulation().night);
    }

    #[test]
    fn test_tuning_change_waits_for_next_run() {
        let mut run = RunController::default();
        let mut ledger = Ledger::default();
        run.start();
        for _ in 0..120 {
            run.tick(FRAME, &TickInput::default(), &mut ledger);
        }

        let mut long = Tuning::default();
        long.road.segment_length = 1600.0;
        run.set_tuning(long);
        assert_eq!(run.simulation().tuning.road.segment_length, 160.0);

        // The current run keeps generating every segment ahead of the camera
        for _ in 0..(60 * 60) {
            run.tick(FRAME, &TickInput::default(), &mut ledger);
        }
        let sim = run.simulation();
        let seg = sim.tuning.road.segment_length;
        let ahead = sim.camera + seg * sim.tuning.road.draw_distance as f32;
        assert!(sim.world.objects().count() > 0);
        assert!(sim.world.objects().all(|o| o.forward < ahead + seg * 2.0));

        run.stop(&mut ledger);
        run.start();
        assert_eq!(run.simulation().tuning.road.segment_length, 1600.0);
    }

    #[test]
    fn test_tuning_is_sanitized_on_the_way_in() {
        let mut run = RunController::default();
        let mut bad = Tuning::default();
        bad.scoring.off_road = -1.0;
        bad.road.segment_length = f32::NAN;
        run.set_tuning(bad);
        let t = &run.simulation().tuning;
        assert!(t.scoring.off_road > 0.0 && t.scoring.off_road < t.drive.steer_clamp);
        assert!(t.road.segment_length >= 1.0);
    }
}
