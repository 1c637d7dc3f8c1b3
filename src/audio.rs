//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed! Every
//! effect is a single enveloped oscillator beep with an optional pitch slide.

use crate::sim::GameEvent;

/// Oscillator shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// Parameters of one beep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beep {
    /// Start frequency (Hz)
    pub freq: f32,
    /// Duration (s)
    pub duration: f32,
    pub waveform: Waveform,
    /// Peak gain before volume scaling
    pub gain: f32,
    /// Frequency change over the duration (Hz, linear)
    pub slide: f32,
}

impl Beep {
    /// Frequency at the end of the beep
    pub fn end_freq(&self) -> f32 {
        self.freq + self.slide
    }
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Menu/shop/toggle confirmation
    Click,
    /// Coin collected
    Coin,
    /// Obstacle hit
    Hit,
    /// Off-road reset
    Reset,
}

impl SoundEffect {
    /// Map a simulation event to the sound it makes, if any
    pub fn from_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::CoinPickup => Some(SoundEffect::Coin),
            GameEvent::ObstacleHit => Some(SoundEffect::Hit),
            GameEvent::RunReset { .. } => Some(SoundEffect::Reset),
            GameEvent::RunStarted | GameEvent::RunStopped { .. } => Some(SoundEffect::Click),
        }
    }

    pub fn beep(self) -> Beep {
        match self {
            SoundEffect::Click => Beep {
                freq: 560.0,
                duration: 0.05,
                waveform: Waveform::Square,
                gain: 0.05,
                slide: -80.0,
            },
            SoundEffect::Coin => Beep {
                freq: 880.0,
                duration: 0.07,
                waveform: Waveform::Triangle,
                gain: 0.06,
                slide: 220.0,
            },
            SoundEffect::Hit => Beep {
                freq: 160.0,
                duration: 0.08,
                waveform: Waveform::Sawtooth,
                gain: 0.05,
                slide: -40.0,
            },
            SoundEffect::Reset => Beep {
                freq: 240.0,
                duration: 0.09,
                waveform: Waveform::Square,
                gain: 0.05,
                slide: 120.0,
            },
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{Beep, SoundEffect, Waveform};
    use crate::settings::Settings;

    /// Envelope floor; exponential ramps can't reach zero
    const SILENCE: f32 = 0.0001;
    /// Attack time (s)
    const ATTACK: f64 = 0.01;

    impl From<Waveform> for OscillatorType {
        fn from(w: Waveform) -> Self {
            match w {
                Waveform::Sine => OscillatorType::Sine,
                Waveform::Square => OscillatorType::Square,
                Waveform::Triangle => OscillatorType::Triangle,
                Waveform::Sawtooth => OscillatorType::Sawtooth,
            }
        }
    }

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        /// Gain applied to every effect (0 when muted)
        volume: f32,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: Settings::default().effective_sfx_volume(),
            }
        }

        /// Pick up volume and mute from the player's settings
        pub fn apply_settings(&mut self, settings: &Settings) {
            self.volume = settings.effective_sfx_volume();
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            self.play_beep(ctx, effect.beep(), vol);
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_beep(&self, ctx: &AudioContext, beep: Beep, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, beep.freq, beep.waveform.into()) else {
                return;
            };
            let t = ctx.current_time();
            let end = t + beep.duration as f64;

            osc.frequency().set_value_at_time(beep.freq, t).ok();
            if beep.slide != 0.0 {
                osc.frequency()
                    .linear_ramp_to_value_at_time(beep.end_freq(), end)
                    .ok();
            }

            let peak = (beep.gain * vol).max(SILENCE);
            gain.gain().set_value_at_time(SILENCE, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(peak, t + ATTACK)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(SILENCE, end)
                .ok();

            osc.start().ok();
            osc.stop_with_when(end + 0.01).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_map_to_effects() {
        assert_eq!(
            SoundEffect::from_event(&GameEvent::CoinPickup),
            Some(SoundEffect::Coin)
        );
        assert_eq!(
            SoundEffect::from_event(&GameEvent::ObstacleHit),
            Some(SoundEffect::Hit)
        );
        assert_eq!(
            SoundEffect::from_event(&GameEvent::RunReset { banked: 2 }),
            Some(SoundEffect::Reset)
        );
    }

    #[test]
    fn test_beep_parameters() {
        let coin = SoundEffect::Coin.beep();
        assert_eq!(coin.freq, 880.0);
        assert_eq!(coin.waveform, Waveform::Triangle);
        assert_eq!(coin.end_freq(), 1100.0);

        let hit = SoundEffect::Hit.beep();
        assert_eq!(hit.waveform, Waveform::Sawtooth);
        assert_eq!(hit.end_freq(), 120.0);

        assert_eq!(SoundEffect::Click.beep().end_freq(), 480.0);
        assert_eq!(SoundEffect::Reset.beep().duration, 0.09);
    }

    #[test]
    fn test_beeps_are_short_and_quiet() {
        for effect in [
            SoundEffect::Click,
            SoundEffect::Coin,
            SoundEffect::Hit,
            SoundEffect::Reset,
        ] {
            let b = effect.beep();
            assert!(b.duration > 0.0 && b.duration < 0.1);
            assert!(b.gain > 0.0 && b.gain <= 0.06);
            assert!(b.end_freq() > 0.0);
        }
    }
}
