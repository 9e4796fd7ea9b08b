//! Game settings and preferences
//!
//! Persisted separately from scores, in their own key-value slot.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, load_json, save_json};
use crate::sim::DifficultySettings;

/// Difficulty levels selectable from the settings menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Normal,
        DifficultyLevel::Hard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "Easy",
            DifficultyLevel::Normal => "Normal",
            DifficultyLevel::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(DifficultyLevel::Easy),
            "normal" | "medium" | "med" => Some(DifficultyLevel::Normal),
            "hard" => Some(DifficultyLevel::Hard),
            _ => None,
        }
    }

    /// Scroll speed at session start (px/tick)
    pub fn base_pipe_speed(&self) -> f32 {
        match self {
            DifficultyLevel::Easy => 2.5,
            DifficultyLevel::Normal => 3.0,
            DifficultyLevel::Hard => 4.0,
        }
    }

    /// Vertical opening between the pipes (px)
    pub fn pipe_gap(&self) -> u32 {
        match self {
            DifficultyLevel::Easy => 220,
            DifficultyLevel::Normal => 200,
            DifficultyLevel::Hard => 170,
        }
    }

    /// Speed added every SPEED_INTERVAL points
    pub fn speed_increment(&self) -> f32 {
        match self {
            DifficultyLevel::Easy => 0.4,
            DifficultyLevel::Normal => 0.5,
            DifficultyLevel::Hard => 0.6,
        }
    }

    /// Session-start baseline for this level
    pub fn baseline(&self) -> DifficultySettings {
        DifficultySettings {
            pipe_speed: self.base_pipe_speed(),
            pipe_gap: self.pipe_gap(),
            speed_increment: self.speed_increment(),
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Difficulty for future sessions
    pub difficulty: DifficultyLevel,

    // === Audio ===
    /// Silence all sound effects
    pub muted: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Visuals ===
    /// Draw drifting background clouds
    pub show_clouds: bool,
    /// Reduced motion (no bird tilt, no sky fade)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: DifficultyLevel::Normal,

            muted: false,
            master_volume: 0.8,
            sfx_volume: 1.0,

            show_clouds: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "flappy_sky_settings";

    /// Set master volume, clamped to 0.0 - 1.0
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set effects volume, clamped to 0.0 - 1.0
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Volume actually applied to effects (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Load settings, falling back to defaults on any problem
    pub fn load(store: &impl KeyValueStore) -> Self {
        match load_json::<Settings>(store, Self::STORAGE_KEY) {
            Ok(Some(mut settings)) => {
                settings.set_master_volume(settings.master_volume);
                settings.set_sfx_volume(settings.sfx_volume);
                log::info!("Loaded settings ({})", settings.difficulty.as_str());
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(err) => {
                log::warn!("Discarding unreadable settings: {}", err);
                Self::default()
            }
        }
    }

    /// Save settings; failures are logged
    pub fn save(&self, store: &impl KeyValueStore) {
        match save_json(store, Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(err) => log::warn!("Could not save settings: {}", err),
        }
    }
}
