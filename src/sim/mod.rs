//! Game simulation
//!
//! Everything that decides where the ball goes and how the round ends.
//! Randomness comes from the round's seeded RNG only, so a seed plus a
//! sequence of tick inputs always replays the same game.

pub mod court;
pub mod projectile;
pub mod shot;
pub mod state;
pub mod tick;

pub use court::{Court, Rim};
pub use projectile::{Projectile, ShotOutcome, Trajectory, launch_velocity, position_at};
pub use shot::{SCORE_BANDS, ShotAttempt, aim_point, derived_accuracy, score_probability};
pub use state::{
    GameEvent, LastShot, RoundPhase, RoundSnapshot, RoundState, SoundCue, draw_target_accuracy,
};
pub use tick::{RoundCommand, RoundOrchestrator, Rules, TickInput, tick};
