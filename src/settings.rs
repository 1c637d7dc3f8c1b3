//! Player settings and preferences
//!
//! Persisted separately from the save profile in LocalStorage.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Road segments drawn ahead of the camera (capped by the generation window)
    pub fn road_segments(&self) -> i32 {
        match self {
            QualityPreset::Low => 110,
            QualityPreset::Medium => 170,
            QualityPreset::High => 220,
        }
    }

    /// Whether roadside buildings and trees are drawn
    pub fn scenery_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }

    /// Number of high-speed streaks
    pub fn streak_count(&self) -> u32 {
        match self {
            QualityPreset::Low => 4,
            QualityPreset::Medium => 8,
            QualityPreset::High => 12,
        }
    }

    /// Triangles per ellipse (coins, wheels, glow)
    pub fn curve_segments(&self) -> u32 {
        match self {
            QualityPreset::Low => 10,
            QualityPreset::Medium => 18,
            QualityPreset::High => 28,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Night palette
    pub night_mode: bool,
    /// Camera shake at high speed
    pub screen_shake: bool,
    /// Diagonal speed streaks
    pub speed_streaks: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no streaks, no wobble)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            night_mode: false,
            screen_shake: true,
            speed_streaks: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low preset drops the full-screen overdraw
        if preset == QualityPreset::Low {
            self.speed_streaks = false;
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective speed streaks (respects reduced_motion)
    pub fn effective_speed_streaks(&self) -> bool {
        self.speed_streaks && !self.reduced_motion
    }

    /// Final gain applied to sound effects
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume.clamp(0.0, 1.0) * self.sfx_volume.clamp(0.0, 1.0))
                .clamp(0.0, 1.0)
        }
    }

    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "endless_road_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring unreadable settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match self.to_json() {
                Ok(json) => {
                    if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                        log::warn!("Settings not saved: storage refused the write");
                    } else {
                        log::info!("Settings saved");
                    }
                }
                Err(e) => log::warn!("Settings not saved: {e}"),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_overrides_effects() {
        let mut s = Settings::default();
        assert!(s.effective_screen_shake());
        assert!(s.effective_speed_streaks());
        s.reduced_motion = true;
        assert!(!s.effective_screen_shake());
        assert!(!s.effective_speed_streaks());
    }

    #[test]
    fn test_low_preset_disables_streaks() {
        let s = Settings::from_preset(QualityPreset::Low);
        assert_eq!(s.quality, QualityPreset::Low);
        assert!(!s.speed_streaks);
        assert!(!s.quality.scenery_enabled());
        assert!(QualityPreset::High.road_segments() > QualityPreset::Low.road_segments());
    }

    #[test]
    fn test_mute_silences_sfx() {
        let mut s = Settings::default();
        assert!((s.effective_sfx_volume() - 0.8).abs() < 1e-6);
        s.muted = true;
        assert_eq!(s.effective_sfx_volume(), 0.0);

        // Out-of-range sliders can't boost past full volume or go negative
        s.muted = false;
        s.master_volume = 3.0;
        s.sfx_volume = 0.5;
        assert_eq!(s.effective_sfx_volume(), 0.5);
        s.sfx_volume = -1.0;
        assert_eq!(s.effective_sfx_volume(), 0.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let s = Settings::from_json(r#"{ "night_mode": true }"#).unwrap();
        assert!(s.night_mode);
        assert!(s.screen_shake);
        assert_eq!(s.quality, QualityPreset::Medium);
        assert!(Settings::from_json("{ quality: ").is_err());
    }
}
