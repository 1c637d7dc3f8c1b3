//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure and deterministic:
//! - World content comes from the spatial hash only
//! - Frame time is clamped before it touches state
//! - No rendering or platform dependencies

pub mod collision;
pub mod hash;
pub mod run;
pub mod state;
pub mod tick;
pub mod world;

pub use collision::{CollisionReport, overlaps, resolve};
pub use hash::{Channel, hash};
pub use run::{RunController, RunPhase};
pub use state::{GameEvent, PlayerState, RunStats, SaveSink, Simulation};
pub use tick::{Steer, TickInput, update};
pub use world::{
    COIN_RADIUS, Coin, ObjectKind, Obstacle, ObstacleKind, PopupTone, ScorePopup, World,
    WorldObject,
};
