//! Projectile flight
//!
//! Closed-form launch solve plus explicit Euler stepping, with rim and
//! boundary checks after every step.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::court::Court;
use super::shot::ShotAttempt;
use crate::consts::TRAJECTORY_LENGTH;
use crate::uniform;

/// How a shot ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotOutcome {
    Score,
    Miss,
}

/// Velocity that carries a ball from `launch` to `aim` in exactly `flight_time`
/// under constant downward `gravity`
pub fn launch_velocity(launch: Vec2, aim: Vec2, flight_time: f32, gravity: f32) -> Vec2 {
    let delta = aim - launch;
    Vec2::new(
        delta.x / flight_time,
        (delta.y - 0.5 * gravity * flight_time * flight_time) / flight_time,
    )
}

/// Analytic position `t` seconds after launch (no collisions)
pub fn position_at(launch: Vec2, velocity: Vec2, gravity: f32, t: f32) -> Vec2 {
    Vec2::new(
        launch.x + velocity.x * t,
        launch.y + velocity.y * t + 0.5 * gravity * t * t,
    )
}

/// Recent ball positions for rendering, oldest first.
/// Never read by the physics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    points: VecDeque<Vec2>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(TRAJECTORY_LENGTH),
        }
    }

    /// Append a point, dropping the oldest past capacity
    pub fn record(&mut self, pos: Vec2) {
        if self.points.len() == TRAJECTORY_LENGTH {
            self.points.pop_front();
        }
        self.points.push_back(pos);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().copied()
    }
}

/// A ball in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    attempt: ShotAttempt,
    pub pos: Vec2,
    pub vel: Vec2,
    active: bool,
    pub trajectory: Trajectory,
}

impl Projectile {
    /// Put a resolved shot in the air
    pub fn launch(attempt: ShotAttempt) -> Self {
        Self {
            pos: attempt.launch(),
            vel: attempt.velocity(),
            attempt,
            active: true,
            trajectory: Trajectory::new(),
        }
    }

    pub fn attempt(&self) -> &ShotAttempt {
        &self.attempt
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance by `dt` seconds. Returns the outcome on the step the shot ends;
    /// once ended, further calls do nothing.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        court: &Court,
        gravity: f32,
        rng: &mut R,
    ) -> Option<ShotOutcome> {
        if !self.active {
            return None;
        }

        self.pos += self.vel * dt;
        self.vel.y += gravity * dt;
        self.trajectory.record(self.pos);

        let rim = &court.rim;
        if rim.band_contains(self.pos.y, court.ball_radius) {
            let dist = rim.horizontal_distance(self.pos.x);
            if dist < rim.radius {
                if self.attempt.will_score() && self.vel.y > 0.0 {
                    self.active = false;
                    return Some(ShotOutcome::Score);
                } else if !self.attempt.will_score() && dist < rim.radius - 5.0 {
                    // Rim-out: pop up weakly and skew sideways
                    self.vel.y = -self.vel.y.abs() * 0.3;
                    self.vel.x += uniform(rng, -100.0, 100.0);
                }
            }
        }

        if court.is_out_of_bounds(self.pos) {
            self.active = false;
            return Some(ShotOutcome::Miss);
        }

        None
    }
}
