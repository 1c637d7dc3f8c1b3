//! Per-frame update step
//!
//! Advances steering, speed and distance from the player's intent and the
//! elapsed time, then drives the world generator and the collision resolver,
//! in that order, every call.

use super::collision::{CollisionReport, resolve};
use super::state::{SaveSink, Simulation};
use crate::consts::*;
use crate::damp;

/// Net steering intent from the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Steer {
    Left,
    #[default]
    Straight,
    Right,
}

impl Steer {
    /// Combine held left/right (both held cancels out)
    pub fn from_held(left: bool, right: bool) -> Self {
        match (left, right) {
            (true, false) => Steer::Left,
            (false, true) => Steer::Right,
            _ => Steer::Straight,
        }
    }

    /// Target steering value (-1, 0, +1)
    pub fn target(self) -> f32 {
        match self {
            Steer::Left => -1.0,
            Steer::Straight => 0.0,
            Steer::Right => 1.0,
        }
    }
}

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub steer: Steer,
}

/// Advance the simulation by one frame of `dt` seconds
pub fn update(
    sim: &mut Simulation,
    input: &TickInput,
    dt: f32,
    save: &mut dyn SaveSink,
) -> CollisionReport {
    // Frame hitches (backgrounded tab, debugger) must not teleport the car
    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
    let drive = &sim.tuning.drive;
    let player = &mut sim.player;

    // Steering and lateral position
    player.steer = damp(player.steer, input.steer.target(), drive.steer_decay, dt);
    player.lateral = (player.lateral + player.steer * dt * drive.lateral_gain)
        .clamp(-drive.steer_clamp, drive.steer_clamp);

    // Cruise speed grows with distance; actual speed eases toward it
    let target = drive.target_speed(sim.run.distance);
    player.speed = damp(player.speed, target, drive.speed_decay, dt);

    let shake_target = sim.speed_fx() * sim.tuning.drive.max_shake;
    sim.player.shake = damp(sim.player.shake, shake_target, sim.tuning.drive.speed_decay, dt);

    // Move the world
    let travelled = sim.player.speed * dt;
    sim.camera += travelled;
    sim.run.distance += travelled;
    sim.run.score += travelled * sim.tuning.scoring.distance_score;

    // Cosmetic timers
    for coin in &mut sim.world.coins {
        coin.phase += dt * COIN_SPIN_RATE;
    }
    for popup in &mut sim.world.popups {
        popup.age += dt * POPUP_AGE_RATE;
    }

    sim.advance_world();
    resolve(sim, save)
}
