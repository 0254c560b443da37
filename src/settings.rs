//! Game settings
//!
//! Loaded from an optional JSON file; every field falls back to the built-in
//! defaults so partial files are fine.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Why a settings file could not be used
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Microphone capture and level extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Samples per second
    pub sample_rate: u32,
    /// Samples per block
    pub block_size: usize,
    /// Band-pass low edge (Hz)
    pub band_low: f32,
    /// Band-pass high edge (Hz)
    pub band_high: f32,
    /// RMS energy mapped to level 100
    pub scale: f32,
    /// Moving-average depth (blocks)
    pub window: usize,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            block_size: BLOCK_SIZE,
            band_low: BAND_LOW,
            band_high: BAND_HIGH,
            scale: LEVEL_SCALE,
            window: LEVEL_WINDOW,
        }
    }
}

impl AudioSettings {
    /// Seconds of audio per block
    pub fn block_duration(&self) -> f32 {
        self.block_size as f32 / self.sample_rate as f32
    }
}

/// Ballistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Time for every shot to reach its aim point (s)
    pub flight_time: f32,
    /// Frame rate assumed when the measured frame delta is unusable
    pub fallback_fps: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            flight_time: FLIGHT_TIME,
            fallback_fps: FPS,
        }
    }
}

/// Round timing and target generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundSettings {
    pub duration_secs: f32,
    pub target_min: u8,
    pub target_max: u8,
    /// How long the last shot's result stays on screen
    pub result_display_secs: f32,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self {
            duration_secs: GAME_DURATION,
            target_min: TARGET_MIN,
            target_max: TARGET_MAX,
            result_display_secs: RESULT_DISPLAY_SECS,
        }
    }
}

/// Court layout in screen space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtSettings {
    pub width: f32,
    pub height: f32,
    /// Where the ball leaves the player's hands
    pub launch: Vec2,
    /// Rim center
    pub basket: Vec2,
    pub rim_radius: f32,
    pub ball_radius: f32,
    pub exit_margin: f32,
}

impl Default for CourtSettings {
    fn default() -> Self {
        // Player stands at 15% of the width, 120 px above a ground line 120 px
        // from the bottom; the ball leaves 30 px in front and 20 px above.
        let ground_y = SCREEN_HEIGHT - 120.0;
        let player = Vec2::new((SCREEN_WIDTH * 0.15).floor(), ground_y - 120.0);
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            launch: player + Vec2::new(30.0, -20.0),
            basket: Vec2::new((SCREEN_WIDTH * 0.70).floor(), (SCREEN_HEIGHT * 0.35).floor()),
            rim_radius: RIM_RADIUS,
            ball_radius: BALL_RADIUS,
            exit_margin: EXIT_MARGIN,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub physics: PhysicsSettings,
    pub round: RoundSettings,
    pub court: CourtSettings,
    /// Fixed RNG seed; `None` seeds from the clock
    pub seed: Option<u64>,
}

impl Settings {
    /// Read and validate settings from a JSON file
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing or bad
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };

        match Self::load_from(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Reject values the game loop cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |field, reason| Err(SettingsError::Invalid { field, reason });

        if self.audio.sample_rate == 0 {
            return invalid("audio.sample_rate", "must be positive");
        }
        if self.audio.block_size == 0 {
            return invalid("audio.block_size", "must be positive");
        }
        if self.audio.window == 0 {
            return invalid("audio.window", "must hold at least one block");
        }
        if !(self.audio.band_low < self.audio.band_high) {
            return invalid("audio.band_low", "must be below audio.band_high");
        }
        if !(self.audio.scale > 0.0) {
            return invalid("audio.scale", "must be positive");
        }
        if !(self.physics.flight_time > 0.0) {
            return invalid("physics.flight_time", "must be positive");
        }
        if !(self.physics.fallback_fps > 0.0) {
            return invalid("physics.fallback_fps", "must be positive");
        }
        if !(self.round.duration_secs > 0.0) {
            return invalid("round.duration_secs", "must be positive");
        }
        if self.round.target_min > self.round.target_max || self.round.target_max > 100 {
            return invalid("round.target_min", "target range must be ordered and within 0..=100");
        }
        Ok(())
    }
}
