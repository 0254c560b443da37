//! Round state and core game types
//!
//! Everything the round loop mutates lives in one [`RoundState`] value.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::projectile::{Projectile, ShotOutcome};
use crate::settings::RoundSettings;

/// Where the round is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Waiting for the first start command
    NotStarted,
    /// Clock running, shots allowed
    Active,
    /// Time ran out; waiting for a restart
    Over,
}

/// Discrete things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted,
    ShotLaunched { accuracy: f32, will_score: bool },
    Scored { score: u32 },
    Missed { misses: u32 },
    NewBest { best: u32 },
    RoundOver { score: u32, best: u32 },
}

/// Sound effects an external player may attach to events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    Score,
    Miss,
    Best,
}

impl GameEvent {
    pub fn sound_cue(&self) -> Option<SoundCue> {
        match self {
            GameEvent::Scored { .. } => Some(SoundCue::Score),
            GameEvent::Missed { .. } => Some(SoundCue::Miss),
            GameEvent::NewBest { .. } => Some(SoundCue::Best),
            _ => None,
        }
    }
}

/// Result banner for the most recent shot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LastShot {
    /// Derived accuracy of the shot
    pub accuracy: f32,
    /// Set once the ball lands
    pub result: Option<ShotOutcome>,
    /// Clock time the result was decided
    pub resolved_at: Option<f64>,
}

impl LastShot {
    /// Banner opacity: 1 when the result lands, fading to 0 over `display_secs`
    pub fn display_alpha(&self, now: f64, display_secs: f32) -> f32 {
        match (self.result, self.resolved_at) {
            (Some(_), Some(at)) if display_secs > 0.0 => {
                let shown = (now - at) as f32;
                if shown < 0.0 {
                    1.0
                } else {
                    (1.0 - shown / display_secs).max(0.0)
                }
            }
            _ => 0.0,
        }
    }
}

/// Draw a fresh target accuracy uniformly from `min..=max`
pub fn draw_target_accuracy<R: Rng + ?Sized>(rng: &mut R, min: u8, max: u8) -> u8 {
    if max <= min {
        min
    } else {
        rng.random_range(min..=max)
    }
}

/// Complete round state
#[derive(Debug, Clone)]
pub struct RoundState {
    pub phase: RoundPhase,
    pub score: u32,
    pub misses: u32,
    pub best: u32,
    /// Voice level the player should hit for the next shot
    pub target_accuracy: u8,
    /// Clock time the current round started
    pub start_time: f64,
    /// Seconds left in the round
    pub remaining: f32,
    /// The ball currently in the air, if any
    pub ball: Option<Projectile>,
    pub last_shot: Option<LastShot>,
    /// Clock time of the previous tick
    pub last_tick: Option<f64>,
    settings: RoundSettings,
    pub(crate) rng: Pcg32,
}

impl RoundState {
    /// Create a fresh state with the given seed
    pub fn new(seed: u64, settings: &RoundSettings) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed), settings)
    }

    /// Create a fresh state drawing all randomness from `rng`
    pub fn with_rng(mut rng: Pcg32, settings: &RoundSettings) -> Self {
        let target_accuracy = draw_target_accuracy(&mut rng, settings.target_min, settings.target_max);
        Self {
            phase: RoundPhase::NotStarted,
            score: 0,
            misses: 0,
            best: 0,
            target_accuracy,
            start_time: 0.0,
            remaining: settings.duration_secs,
            ball: None,
            last_shot: None,
            last_tick: None,
            settings: settings.clone(),
            rng,
        }
    }

    pub fn settings(&self) -> &RoundSettings {
        &self.settings
    }

    /// True when no ball is in the air
    pub fn is_ready(&self) -> bool {
        self.ball.is_none()
    }

    /// Pick the next target accuracy
    pub fn redraw_target(&mut self) {
        self.target_accuracy =
            draw_target_accuracy(&mut self.rng, self.settings.target_min, self.settings.target_max);
    }

    /// Raise best to the current score; true if it went up
    pub fn commit_best(&mut self) -> bool {
        if self.score > self.best {
            self.best = self.score;
            true
        } else {
            false
        }
    }

    /// Begin a new round at clock time `now`, keeping the best score
    pub fn start_round(&mut self, now: f64) {
        self.commit_best();
        self.score = 0;
        self.misses = 0;
        self.ball = None;
        self.phase = RoundPhase::Active;
        self.start_time = now;
        self.remaining = self.settings.duration_secs;
        self.redraw_target();
        self.last_shot = None;
        log::info!("Round started (target accuracy {})", self.target_accuracy);
    }

    /// End the round: drop any ball in flight and commit the best score
    pub fn finish_round(&mut self, events: &mut Vec<GameEvent>) {
        self.phase = RoundPhase::Over;
        self.remaining = 0.0;
        self.ball = None;
        if self.commit_best() {
            events.push(GameEvent::NewBest { best: self.best });
        }
        events.push(GameEvent::RoundOver {
            score: self.score,
            best: self.best,
        });
        log::info!("Round over: score {} misses {} best {}", self.score, self.misses, self.best);
    }

    /// Apply a landed shot at clock time `now`
    pub fn apply_outcome(&mut self, outcome: ShotOutcome, now: f64, events: &mut Vec<GameEvent>) {
        self.ball = None;
        match outcome {
            ShotOutcome::Score => {
                self.score += 1;
                events.push(GameEvent::Scored { score: self.score });
                if self.commit_best() {
                    events.push(GameEvent::NewBest { best: self.best });
                }
            }
            ShotOutcome::Miss => {
                self.misses += 1;
                events.push(GameEvent::Missed {
                    misses: self.misses,
                });
            }
        }
        if let Some(last) = self.last_shot.as_mut() {
            last.result = Some(outcome);
            last.resolved_at = Some(now);
        }
        self.redraw_target();
        log::debug!("Shot {:?}; next target {}", outcome, self.target_accuracy);
    }

    /// Read-only view for renderers
    pub fn snapshot(&self, now: f64) -> RoundSnapshot {
        let (ball, trajectory) = match &self.ball {
            Some(ball) => (Some(ball.pos), ball.trajectory.points().collect()),
            None => (None, Vec::new()),
        };
        RoundSnapshot {
            phase: self.phase,
            score: self.score,
            misses: self.misses,
            best: self.best,
            remaining: self.remaining,
            target_accuracy: self.target_accuracy,
            ready: self.is_ready(),
            ball,
            trajectory,
            last_shot: self.last_shot,
            result_alpha: self
                .last_shot
                .map_or(0.0, |s| s.display_alpha(now, self.settings.result_display_secs)),
        }
    }
}

/// Per-tick view of the round for HUD and drawing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub phase: RoundPhase,
    pub score: u32,
    pub misses: u32,
    pub best: u32,
    pub remaining: f32,
    pub target_accuracy: u8,
    /// No ball in the air
    pub ready: bool,
    pub ball: Option<Vec2>,
    pub trajectory: Vec<Vec2>,
    pub last_shot: Option<LastShot>,
    /// Opacity of the last shot's result banner
    pub result_alpha: f32,
}
