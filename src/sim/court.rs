//! Court geometry
//!
//! Screen-space layout the projectile is tested against: the rim's catch band
//! and the edges of the visible play area. y grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::RIM_DEPTH;
use crate::settings::CourtSettings;

/// The basket rim
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rim {
    /// Rim center
    pub center: Vec2,
    /// Horizontal half-width of the opening
    pub radius: f32,
    /// How far below the rim line a ball is still "at the rim"
    pub depth: f32,
}

impl Rim {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self {
            center,
            radius,
            depth: RIM_DEPTH,
        }
    }

    /// Whether a ball center at height `y` is inside the rim's vertical band
    #[inline]
    pub fn band_contains(&self, y: f32, ball_radius: f32) -> bool {
        y >= self.center.y - ball_radius && y <= self.center.y + self.depth
    }

    /// Horizontal distance from the rim center
    #[inline]
    pub fn horizontal_distance(&self, x: f32) -> f32 {
        (x - self.center.x).abs()
    }
}

/// Everything the projectile needs to know about the court
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub width: f32,
    pub height: f32,
    /// Launch point
    pub launch: Vec2,
    pub rim: Rim,
    pub ball_radius: f32,
    /// Slack past the screen edges before a ball is gone
    pub exit_margin: f32,
}

impl Default for Court {
    fn default() -> Self {
        Self::from(&CourtSettings::default())
    }
}

impl From<&CourtSettings> for Court {
    fn from(settings: &CourtSettings) -> Self {
        Self {
            width: settings.width,
            height: settings.height,
            launch: settings.launch,
            rim: Rim::new(settings.basket, settings.rim_radius),
            ball_radius: settings.ball_radius,
            exit_margin: settings.exit_margin,
        }
    }
}

impl Court {
    /// Nominal target point for every shot
    #[inline]
    pub fn basket(&self) -> Vec2 {
        self.rim.center
    }

    /// Past either side or below the bottom (the top is open sky)
    pub fn is_out_of_bounds(&self, pos: Vec2) -> bool {
        pos.x > self.width + self.exit_margin
            || pos.x < -self.exit_margin
            || pos.y > self.height + self.exit_margin
    }
}
