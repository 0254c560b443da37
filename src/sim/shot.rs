//! Shot resolution
//!
//! Converts the voice level at trigger time into an accuracy score, draws the
//! make/miss decision from a fixed band table, and places the aim point the
//! ball will be launched at.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::court::Court;
use super::projectile::launch_velocity;
use crate::uniform;

/// Accuracy range a score band covers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BandRange {
    /// Accuracy strictly below the value
    Below(f32),
    /// Accuracy within `low..=high`
    Between(f32, f32),
}

impl BandRange {
    fn contains(self, accuracy: f32) -> bool {
        match self {
            BandRange::Below(limit) => accuracy < limit,
            BandRange::Between(low, high) => (low..=high).contains(&accuracy),
        }
    }
}

/// One row of the score table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBand {
    pub range: BandRange,
    /// Chance the shot goes in
    pub probability: f64,
}

/// Score chance by derived accuracy, checked top to bottom.
/// The breakpoints are gameplay; do not smooth them into a curve.
/// Accuracies no row covers, including the gaps between rows, always score.
pub const SCORE_BANDS: [ScoreBand; 5] = [
    ScoreBand { range: BandRange::Below(75.0), probability: 0.0 },
    ScoreBand { range: BandRange::Between(75.0, 80.0), probability: 0.70 },
    ScoreBand { range: BandRange::Between(81.0, 84.0), probability: 0.80 },
    ScoreBand { range: BandRange::Between(85.0, 90.0), probability: 0.85 },
    ScoreBand { range: BandRange::Between(91.0, 95.0), probability: 0.90 },
];

/// Chance for an accuracy outside every band
pub const UNBANDED_PROBABILITY: f64 = 1.0;

/// Below this accuracy a shot always falls short
pub const UNDERSHOOT_BELOW: f32 = 75.0;

/// Scoring probability for a derived accuracy
pub fn score_probability(accuracy: f32) -> f64 {
    SCORE_BANDS
        .iter()
        .find(|band| band.range.contains(accuracy))
        .map_or(UNBANDED_PROBABILITY, |band| band.probability)
}

/// Clamp a voice level into 0-100; NaN reads as silence
pub fn clamp_level(level: f32) -> f32 {
    if level.is_nan() { 0.0 } else { level.clamp(0.0, 100.0) }
}

/// `100 - |target - measured|`, floored at 0
pub fn derived_accuracy(target_accuracy: u8, measured_level: f32) -> f32 {
    let measured = clamp_level(measured_level);
    (100.0 - (target_accuracy as f32 - measured).abs()).max(0.0)
}

/// Aim point for a shot at `basket`
pub fn aim_point<R: Rng + ?Sized>(basket: Vec2, accuracy: f32, will_score: bool, rng: &mut R) -> Vec2 {
    if accuracy < UNDERSHOOT_BELOW {
        let undershoot = (UNDERSHOOT_BELOW - accuracy) * 5.0;
        Vec2::new(basket.x - undershoot - 50.0, basket.y + 30.0)
    } else if accuracy <= 100.0 {
        let max_error = (100.0 - accuracy) * 0.8;
        if will_score {
            Vec2::new(
                basket.x + uniform(rng, -max_error * 0.3, max_error * 0.3),
                basket.y,
            )
        } else {
            Vec2::new(
                basket.x + uniform(rng, -max_error * 2.0, max_error * 2.0),
                basket.y + uniform(rng, -10.0, 15.0),
            )
        }
    } else {
        // Not reachable through derived_accuracy
        let overshoot = (accuracy - 100.0) * 4.0;
        Vec2::new(basket.x + overshoot + 30.0, basket.y - 20.0)
    }
}

/// A resolved shot. Fixed at creation; the make/miss decision never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotAttempt {
    target_accuracy: u8,
    measured_level: f32,
    derived_accuracy: f32,
    will_score: bool,
    launch: Vec2,
    aim_point: Vec2,
    velocity: Vec2,
}

impl ShotAttempt {
    /// Resolve a shot taken with voice level `measured_level` against `target_accuracy`
    pub fn resolve<R: Rng + ?Sized>(
        measured_level: f32,
        target_accuracy: u8,
        court: &Court,
        gravity: f32,
        flight_time: f32,
        rng: &mut R,
    ) -> Self {
        let measured_level = clamp_level(measured_level);
        let accuracy = derived_accuracy(target_accuracy, measured_level);
        let roll: f64 = rng.random();
        let will_score = roll < score_probability(accuracy);

        let aim = aim_point(court.basket(), accuracy, will_score, rng);
        let velocity = launch_velocity(court.launch, aim, flight_time, gravity);

        log::debug!(
            "Shot resolved: level={:.1} target={} accuracy={:.1} will_score={} aim=({:.0}, {:.0})",
            measured_level,
            target_accuracy,
            accuracy,
            will_score,
            aim.x,
            aim.y
        );

        Self {
            target_accuracy,
            measured_level,
            derived_accuracy: accuracy,
            will_score,
            launch: court.launch,
            aim_point: aim,
            velocity,
        }
    }

    pub fn target_accuracy(&self) -> u8 {
        self.target_accuracy
    }

    pub fn measured_level(&self) -> f32 {
        self.measured_level
    }

    pub fn derived_accuracy(&self) -> f32 {
        self.derived_accuracy
    }

    pub fn will_score(&self) -> bool {
        self.will_score
    }

    pub fn launch(&self) -> Vec2 {
        self.launch
    }

    pub fn aim_point(&self) -> Vec2 {
        self.aim_point
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }
}
