//! Save coalescing for drag moves and viewport changes.
//!
//! Node moves schedule a position save that fires once no further move has arrived for the
//! quiet period. Viewport changes save on move-end, immediately. Time is passed in so the
//! debouncer runs without a timer or runtime.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveRequest {
    Positions,
    Viewport,
}

#[derive(Debug, Clone)]
pub struct SaveDebouncer {
    quiet: Duration,
    last_move: Option<Instant>,
}

impl SaveDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_move: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    pub fn is_pending(&self) -> bool {
        self.last_move.is_some()
    }

    /// Records a move; restarts the quiet period.
    pub fn node_moved(&mut self, now: Instant) {
        self.last_move = Some(now);
    }

    /// When the pending position save becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.last_move.map(|t| t + self.quiet)
    }

    /// Emits the pending position save once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<SaveRequest> {
        let due = self.deadline()?;
        if now >= due {
            self.last_move = None;
            Some(SaveRequest::Positions)
        } else {
            None
        }
    }

    /// Emits the pending position save right away (e.g. on teardown).
    pub fn flush(&mut self) -> Option<SaveRequest> {
        self.last_move.take().map(|_| SaveRequest::Positions)
    }
}
