//! Hand gesture shoot trigger
//!
//! A hand classifier (outside this crate) reports per frame whether the hand
//! looks open and whether it looks closed. The trigger turns that noisy level
//! signal into a single shot per closed → open cycle.

use serde::{Deserialize, Serialize};

/// One frame of hand classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HandReading {
    /// No hand detected this frame
    #[default]
    NoHand,
    /// A hand was detected; both flags may be false for an ambiguous pose
    Hand { open: bool, closed: bool },
}

impl HandReading {
    pub const OPEN: Self = Self::Hand {
        open: true,
        closed: false,
    };
    pub const CLOSED: Self = Self::Hand {
        open: false,
        closed: true,
    };

    /// Build from optional classifier flags; two `None`s mean no hand
    pub fn from_flags(open: Option<bool>, closed: Option<bool>) -> Self {
        match (open, closed) {
            (None, None) => Self::NoHand,
            (open, closed) => Self::Hand {
                open: open.unwrap_or(false),
                closed: closed.unwrap_or(false),
            },
        }
    }

    /// (is_open, is_closed) for this frame
    fn flags(self) -> (bool, bool) {
        match self {
            Self::NoHand => (false, false),
            Self::Hand { open, closed } => (open, closed),
        }
    }
}

/// Pose remembered from the previous frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureState {
    Neutral,
    Open,
    Closed,
}

/// Edge-triggered shoot detector
#[derive(Debug, Clone, Default)]
pub struct GestureTrigger {
    last_open: bool,
    last_closed: bool,
}

impl GestureTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame; returns true on the frame a shot should fire.
    ///
    /// Fires when the hand is open now, was not open last frame, and was
    /// closed last frame. Holding the hand open never re-fires.
    pub fn process(&mut self, reading: HandReading) -> bool {
        let (is_open, is_closed) = reading.flags();
        let shoot = is_open && !self.last_open && self.last_closed;

        self.last_open = is_open;
        self.last_closed = is_closed;

        if shoot {
            log::debug!("Shoot gesture detected");
        }
        shoot
    }

    /// Forget any remembered pose
    pub fn reset(&mut self) {
        self.last_open = false;
        self.last_closed = false;
    }

    pub fn state(&self) -> GestureState {
        if self.last_open {
            GestureState::Open
        } else if self.last_closed {
            GestureState::Closed
        } else {
            GestureState::Neutral
        }
    }
}
