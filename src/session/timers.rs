use std::time::{Duration, Instant};

/// What one tick of the turn countdown did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnTick {
    /// Not armed; the tick is stale and should be ignored.
    Idle,
    /// Still counting; seconds left.
    Remaining(u32),
    /// Reached zero. The timer has disarmed itself.
    Expired,
}

/// Countdown for the local player's turn. A disarmed timer never counts,
/// so it expires at most once per arming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnTimer {
    remaining: u32,
    armed: bool,
}

impl TurnTimer {
    pub fn arm(&mut self, seconds: u32) {
        self.remaining = seconds;
        self.armed = true;
    }

    /// Returns whether the timer was running.
    pub fn disarm(&mut self) -> bool {
        std::mem::replace(&mut self.armed, false)
    }

    pub fn tick(&mut self) -> TurnTick {
        if !self.armed {
            return TurnTick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.armed = false;
            TurnTick::Expired
        } else {
            TurnTick::Remaining(self.remaining)
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

/// Elapsed time of the current game. Display only.
#[derive(Debug, Clone, Copy)]
pub struct MatchTimer {
    started: Instant,
    stopped: Option<Instant>,
}

impl MatchTimer {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            stopped: None,
        }
    }

    pub fn restart(&mut self) {
        *self = MatchTimer::new();
    }

    /// Freezes the reading at the current instant.
    pub fn stop(&mut self) {
        self.stopped.get_or_insert_with(Instant::now);
    }

    pub fn is_running(&self) -> bool {
        self.stopped.is_none()
    }

    pub fn elapsed(&self) -> Duration {
        self.stopped
            .unwrap_or_else(Instant::now)
            .duration_since(self.started)
    }
}

impl Default for MatchTimer {
    fn default() -> Self {
        Self::new()
    }
}
