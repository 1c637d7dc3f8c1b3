//! Deterministic spatial hash
//!
//! The only source of "randomness" for world generation. A segment index maps
//! to the same value on every call, in every run, so the generator can prune
//! and regenerate content without storing any history.

/// Independent decision channels. Each one scrambles the segment index with
/// its own multiplier so lane choice, spawn gates and jitter don't correlate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    CoinGate,
    CoinLane,
    CoinSpread,
    CoinOffset,
    CoinPhase,
    ObstacleGate,
    ObstacleLane,
    ObstacleSpread,
    ObstacleKind,
    ObstacleOffset,
    /// Height of roadside buildings and trees (renderer only)
    Scenery,
}

impl Channel {
    /// Multiplier applied to the segment index before hashing
    pub const fn multiplier(self) -> f64 {
        match self {
            Channel::CoinGate => 3.1,
            Channel::CoinLane => 7.7,
            Channel::CoinSpread => 2.9,
            Channel::CoinOffset => 1.7,
            Channel::CoinPhase => 6.3,
            Channel::ObstacleGate => 5.2,
            Channel::ObstacleLane => 11.2,
            Channel::ObstacleSpread => 4.4,
            Channel::ObstacleKind => 13.3,
            Channel::ObstacleOffset => 8.9,
            Channel::Scenery => 17.9,
        }
    }

    /// Sample this channel for a segment
    #[inline]
    pub fn sample(self, segment: i64) -> f64 {
        hash(segment as f64 * self.multiplier())
    }
}

/// Map any real to a reproducible value in [0, 1)
///
/// Sinusoidal scramble: `fract(sin(n * 999.1337) * 10000)`. Total: non-finite
/// input maps to 0.
#[inline]
pub fn hash(n: f64) -> f64 {
    let s = (n * 999.1337).sin() * 10000.0;
    let f = s - s.floor();
    // fract of a tiny negative rounds up to exactly 1.0
    if f.is_finite() && f < 1.0 { f } else { 0.0 }
}
