//! Save profile: banked coins, car cosmetics and unlocked body styles
//!
//! Persisted to LocalStorage. The simulation only ever sees it through
//! `SaveSink`, so banking coins is the one write a run can trigger.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::sim::SaveSink;

/// Paint colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarColor {
    #[default]
    Mint,
    Sky,
    Sun,
    Rose,
    White,
    Lava,
}

impl CarColor {
    pub const ALL: [CarColor; 6] = [
        CarColor::Mint,
        CarColor::Sky,
        CarColor::Sun,
        CarColor::Rose,
        CarColor::White,
        CarColor::Lava,
    ];

    /// 0xRRGGBB
    pub const fn hex(self) -> u32 {
        match self {
            CarColor::Mint => 0x7cffb3,
            CarColor::Sky => 0x66a3ff,
            CarColor::Sun => 0xffd36b,
            CarColor::Rose => 0xff6fa3,
            CarColor::White => 0xeaf2ff,
            CarColor::Lava => 0xff5e4d,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CarColor::Mint => "MINT",
            CarColor::Sky => "SKY",
            CarColor::Sun => "SUN",
            CarColor::Rose => "ROSE",
            CarColor::White => "WHITE",
            CarColor::Lava => "LAVA",
        }
    }
}

/// Wheel sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelStyle {
    #[default]
    Classic,
    Sport,
    Chunky,
}

impl WheelStyle {
    pub const ALL: [WheelStyle; 3] = [WheelStyle::Classic, WheelStyle::Sport, WheelStyle::Chunky];

    pub fn name(self) -> &'static str {
        match self {
            WheelStyle::Classic => "CLASSIC",
            WheelStyle::Sport => "SPORT",
            WheelStyle::Chunky => "CHUNKY",
        }
    }
}

/// Car bodies; everything but the hatch is bought with banked coins
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BodyStyle {
    #[default]
    Hatch,
    Coupe,
    Truck,
    Super,
}

impl BodyStyle {
    pub const ALL: [BodyStyle; 4] = [
        BodyStyle::Hatch,
        BodyStyle::Coupe,
        BodyStyle::Truck,
        BodyStyle::Super,
    ];

    /// Unlock price in coins
    pub const fn price(self) -> u32 {
        match self {
            BodyStyle::Hatch => 0,
            BodyStyle::Coupe => 120,
            BodyStyle::Truck => 220,
            BodyStyle::Super => 400,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BodyStyle::Hatch => "HATCH",
            BodyStyle::Coupe => "COUPE",
            BodyStyle::Truck => "TRUCK",
            BodyStyle::Super => "SUPER",
        }
    }

    pub fn blurb(self) -> &'static str {
        match self {
            BodyStyle::Hatch => "Starter car",
            BodyStyle::Coupe => "Fast look",
            BodyStyle::Truck => "Big body",
            BodyStyle::Super => "Rare style",
        }
    }
}

/// What the renderer needs to draw the player's car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Cosmetics {
    pub color: CarColor,
    pub wheels: WheelStyle,
    pub body: BodyStyle,
}

/// Result of trying to buy a body style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purchase {
    /// Already unlocked; now selected
    AlreadyOwned,
    /// Paid for and selected
    Unlocked,
    NotEnoughCoins { missing: u32 },
}

/// Persistent player profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Coins banked across all runs, minus purchases
    pub coins_total: u32,
    pub cosmetics: Cosmetics,
    unlocked: BTreeSet<BodyStyle>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            coins_total: 0,
            cosmetics: Cosmetics::default(),
            unlocked: BTreeSet::from([BodyStyle::Hatch]),
        }
    }
}

impl SaveSink for Profile {
    fn bank_coins(&mut self, coins: u32) {
        self.coins_total = self.coins_total.saturating_add(coins);
        log::info!("Banked {coins} coins ({} total)", self.coins_total);
        self.save();
    }
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free bodies are always owned
    pub fn is_unlocked(&self, body: BodyStyle) -> bool {
        body.price() == 0 || self.unlocked.contains(&body)
    }

    pub fn unlocked(&self) -> impl Iterator<Item = BodyStyle> + '_ {
        BodyStyle::ALL.into_iter().filter(|b| self.is_unlocked(*b))
    }

    pub fn select_color(&mut self, color: CarColor) {
        self.cosmetics.color = color;
        self.save();
    }

    pub fn select_wheels(&mut self, wheels: WheelStyle) {
        self.cosmetics.wheels = wheels;
        self.save();
    }

    /// Select an owned body, or try to buy it
    pub fn try_unlock(&mut self, body: BodyStyle) -> Purchase {
        if self.is_unlocked(body) {
            self.cosmetics.body = body;
            self.save();
            return Purchase::AlreadyOwned;
        }

        let price = body.price();
        if self.coins_total < price {
            return Purchase::NotEnoughCoins {
                missing: price - self.coins_total,
            };
        }

        self.coins_total -= price;
        self.unlocked.insert(body);
        self.cosmetics.body = body;
        log::info!("Unlocked {} for {price} coins", body.name());
        self.save();
        Purchase::Unlocked
    }

    /// Repair anything a hand-edited or stale save could get wrong
    fn sanitized(mut self) -> Self {
        self.unlocked.insert(BodyStyle::Hatch);
        if !self.is_unlocked(self.cosmetics.body) {
            log::warn!(
                "Selected body {:?} is not unlocked, falling back to hatch",
                self.cosmetics.body
            );
            self.cosmetics.body = BodyStyle::Hatch;
        }
        self
    }

    /// Parse a saved profile; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let profile: Profile = serde_json::from_str(json)?;
        Ok(profile.sanitized())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "endless_road_profile_v1";

    /// Load the profile from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(profile) => {
                        log::info!("Loaded profile ({} coins)", profile.coins_total);
                        return profile;
                    }
                    Err(e) => log::warn!("Ignoring unreadable profile: {e}"),
                }
            }
        }

        log::info!("No profile found, starting fresh");
        Self::new()
    }

    /// Save the profile to LocalStorage (WASM only). Failures are logged
    /// and otherwise ignored.
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let Some(storage) = storage else {
            log::warn!("Profile not saved: no LocalStorage");
            return;
        };
        match self.to_json() {
            Ok(json) => {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Profile not saved: storage refused the write");
                }
            }
            Err(e) => log::warn!("Profile not saved: {e}"),
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
