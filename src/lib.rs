//! Voice Throw - a free-throw arcade game played with your voice and one hand
//!
//! Core modules:
//! - `capture`: Microphone level extraction (band-pass, RMS, moving average)
//! - `gesture`: Edge-triggered open/closed hand shoot trigger
//! - `sim`: Shot resolution, projectile physics and the round loop
//! - `settings`: Data-driven game configuration

pub mod capture;
pub mod gesture;
pub mod settings;
pub mod sim;

pub use capture::{AudioCapture, LevelExtractor, SharedLevel};
pub use gesture::{GestureTrigger, HandReading};
pub use settings::Settings;

use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Screen dimensions (pixels, y grows downward)
    pub const SCREEN_WIDTH: f32 = 1280.0;
    pub const SCREEN_HEIGHT: f32 = 720.0;
    /// Frame rate used when the wall clock delta is unusable
    pub const FPS: f32 = 60.0;

    /// Audio capture defaults
    pub const SAMPLE_RATE: u32 = 44_100;
    pub const BLOCK_SIZE: usize = 1024;
    /// Band-pass edges (Hz); DC, wind rumble and hiss fall outside
    pub const BAND_LOW: f32 = 300.0;
    pub const BAND_HIGH: f32 = 3000.0;
    /// RMS energy that maps to a level of 100
    pub const LEVEL_SCALE: f32 = 300.0;
    /// Moving-average depth in blocks (~185 ms at defaults)
    pub const LEVEL_WINDOW: usize = 8;

    /// Ballistics
    pub const GRAVITY: f32 = 1200.0;
    /// Every shot takes exactly this long to reach its aim point
    pub const FLIGHT_TIME: f32 = 1.0;
    pub const BALL_RADIUS: f32 = 18.0;
    pub const RIM_RADIUS: f32 = 50.0;
    /// How far below the rim line the basket still catches the ball
    pub const RIM_DEPTH: f32 = 30.0;
    /// Off-screen slack before a ball counts as gone
    pub const EXIT_MARGIN: f32 = 50.0;
    /// Trail points kept for rendering
    pub const TRAJECTORY_LENGTH: usize = 15;

    /// Round timing
    pub const GAME_DURATION: f32 = 60.0;
    pub const RESULT_DISPLAY_SECS: f32 = 2.0;

    /// Target accuracy range (inclusive)
    pub const TARGET_MIN: u8 = 40;
    pub const TARGET_MAX: u8 = 95;
}

/// Uniform draw on `[lo, hi)`, collapsing to `lo` for an empty range
#[inline]
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        lo
    } else {
        lo + (hi - lo) * rng.random::<f32>()
    }
}
