//! Game settings and preferences
//!
//! Persisted separately from the leaderboard in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::{HAPPY_THRESHOLD, HAPPY_THRESHOLD_RELAXED};
use crate::persistence::Storage;
use crate::tuning::Tuning;

/// How big a smile has to be before the dino jumps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Sensitivity {
    /// Needs a big grin
    #[default]
    Strict,
    /// A smaller smile is enough
    Relaxed,
}

impl Sensitivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sensitivity::Strict => "Strict",
            Sensitivity::Relaxed => "Relaxed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "strict" | "high" => Some(Sensitivity::Strict),
            "relaxed" | "low" => Some(Sensitivity::Relaxed),
            _ => None,
        }
    }

    /// Happiness level that must be exceeded to jump
    pub fn threshold(&self) -> f32 {
        match self {
            Sensitivity::Strict => HAPPY_THRESHOLD,
            Sensitivity::Relaxed => HAPPY_THRESHOLD_RELAXED,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Smile detection sensitivity
    pub sensitivity: Sensitivity,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Background music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === HUD ===
    /// Show the "smile to jump" help bubble
    pub show_help: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::Strict,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            show_help: true,
        }
    }
}

impl Settings {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "smile_jump_settings";

    /// Round tuning with this player's sensitivity applied
    pub fn tuning(&self) -> Tuning {
        Tuning {
            happy_threshold: self.sensitivity.threshold(),
            ..Tuning::default()
        }
    }

    /// Effective sound effect volume (respects mute)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Effective music volume (respects mute)
    pub fn effective_music_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.music_volume).clamp(0.0, 1.0)
        }
    }

    /// Load settings; missing or malformed data yields defaults
    pub fn load(storage: &impl Storage) -> Self {
        if let Some(json) = storage.get_item(Self::STORAGE_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring malformed settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings
    pub fn save(&self, storage: &impl Storage) {
        if let Ok(json) = serde_json::to_string(self) {
            storage.set_item(Self::STORAGE_KEY, &json);
            log::info!("Settings saved");
        }
    }
}
