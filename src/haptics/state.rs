//! Idle/active tracking for the motor stream

use crate::mapping::MotorIntensity;
use std::time::{Duration, Instant};

/// What a single motor reading did to the activity state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Idle -> Active. `idle_for` is `None` when no idle start was ever
    /// recorded (nothing has played yet).
    BecameActive { idle_for: Option<Duration> },
    StillActive,
    /// Active -> Idle, timestamp recorded
    BecameIdle,
    StillIdle,
}

impl Edge {
    /// Whether this rising edge followed at least `threshold` of silence
    pub fn idle_at_least(&self, threshold: Duration) -> bool {
        match self {
            Edge::BecameActive { idle_for: None } => true,
            Edge::BecameActive { idle_for: Some(idle) } => *idle >= threshold,
            _ => false,
        }
    }
}

/// Most recent idle/active transition
#[derive(Debug, Clone)]
pub struct ActivityState {
    last_was_zero: bool,
    zero_since: Option<Instant>,
}

impl ActivityState {
    /// Idle, with no recorded start of the idle period
    pub fn new() -> Self {
        Self {
            last_was_zero: true,
            zero_since: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.last_was_zero
    }

    /// When the current idle period began
    pub fn idle_since(&self) -> Option<Instant> {
        self.zero_since
    }

    /// Feed one combined motor reading taken at `now`
    pub fn observe(&mut self, motor: MotorIntensity, now: Instant) -> Edge {
        match (self.last_was_zero, motor == 0) {
            (true, true) => Edge::StillIdle,
            (false, true) => {
                self.last_was_zero = true;
                self.zero_since = Some(now);
                Edge::BecameIdle
            }
            (true, false) => {
                self.last_was_zero = false;
                let idle_for = self.zero_since.map(|since| now.saturating_duration_since(since));
                Edge::BecameActive { idle_for }
            }
            (false, false) => Edge::StillActive,
        }
    }
}

impl Default for ActivityState {
    fn default() -> Self {
        Self::new()
    }
}
