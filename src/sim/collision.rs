//! Collision and scoring
//!
//! The player's hitbox lives in road space: its lateral offset and a forward
//! position a fixed lead ahead of the camera. Coins and obstacles are tested
//! independently and both are idempotent once flagged, so iteration order
//! never matters.

use glam::Vec2;

use super::state::{GameEvent, SaveSink, Simulation};
use super::world::{ObjectKind, PopupTone};

/// Popup anchors in normalized screen space
const COIN_POPUP_ANCHOR: Vec2 = Vec2::new(0.5, 0.55);
const HIT_POPUP_ANCHOR: Vec2 = Vec2::new(0.5, 0.57);

/// What one resolve pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionReport {
    pub coins: u32,
    pub hits: u32,
    pub reset: bool,
}

/// Check whether a hitbox overlaps an object at the given reach
#[inline]
pub fn overlaps(hitbox: Vec2, object: Vec2, (reach_forward, reach_lateral): (f32, f32)) -> bool {
    (object.y - hitbox.y).abs() < reach_forward && (object.x - hitbox.x).abs() < reach_lateral
}

/// Resolve pickups, hits and the off-road condition for this frame
pub fn resolve(sim: &mut Simulation, save: &mut dyn SaveSink) -> CollisionReport {
    let mut report = CollisionReport::default();
    let scoring = &sim.tuning.scoring;
    // x = lateral, y = forward
    let hitbox = Vec2::new(sim.player.lateral, sim.player_forward());

    // --- COINS ---
    let coin_reach = scoring.reach(ObjectKind::Coin);
    for coin in &mut sim.world.coins {
        if coin.taken || !overlaps(hitbox, Vec2::new(coin.lateral, coin.forward), coin_reach) {
            continue;
        }
        coin.taken = true;
        report.coins += 1;
    }
    if report.coins > 0 {
        sim.world.coins.retain(|c| !c.taken);
        sim.run.coins += report.coins;
        sim.run.score += scoring.coin_reward * report.coins as f32;
        for _ in 0..report.coins {
            sim.world.push_popup(
                format!("+{}", scoring.coin_reward),
                COIN_POPUP_ANCHOR,
                PopupTone::Gain,
            );
            sim.events.push(GameEvent::CoinPickup);
        }
    }

    // --- OBSTACLES ---
    for obstacle in &mut sim.world.obstacles {
        let reach = scoring.reach(ObjectKind::Obstacle(obstacle.kind));
        if obstacle.hit || !overlaps(hitbox, Vec2::new(obstacle.lateral, obstacle.forward), reach) {
            continue;
        }
        // Flag only; obstacles stay on the road until pruned
        obstacle.hit = true;
        report.hits += 1;
        log::debug!("Hit {:?} at forward {:.0}", obstacle.kind, obstacle.forward);
    }
    for _ in 0..report.hits {
        sim.player.speed = (sim.player.speed * scoring.hit_speed_factor).max(scoring.hit_speed_floor);
        sim.run.score = (sim.run.score - scoring.obstacle_penalty).max(0.0);
        sim.world.push_popup(
            format!("-{}", scoring.obstacle_penalty),
            HIT_POPUP_ANCHOR,
            PopupTone::Loss,
        );
        sim.events.push(GameEvent::ObstacleHit);
    }

    // --- OFF ROAD ---
    if sim.player.lateral.abs() > scoring.off_road {
        sim.reset_run(save);
        report.reset = true;
    }

    report
}
