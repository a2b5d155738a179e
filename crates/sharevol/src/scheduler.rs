//! Two-stage redraw scheduling.
//!
//! Every interactive change asks for an immediate low-quality frame and a
//! high-quality frame once input has been quiet for the debounce delay. A
//! new request replaces the pending deadline, so a burst of drags or wheel
//! spins ends in exactly one high-quality frame.

use std::time::{Duration, Instant};

use sharevol_render::Quality;

/// Debounced redraw scheduler.
#[derive(Debug, Clone)]
pub struct RenderScheduler {
    delay: Duration,
    deadline: Option<Instant>,
}

impl RenderScheduler {
    /// Creates a scheduler with the given quiet period.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Registers a change at `now`.
    ///
    /// Returns [`Quality::Low`] when an immediate frame should be drawn,
    /// which is always unless `skip_immediate` is set. Any pending
    /// high-quality frame is pushed back to `now + delay`.
    pub fn trigger(&mut self, now: Instant, skip_immediate: bool) -> Option<Quality> {
        self.deadline = Some(now + self.delay);
        log::debug!("high quality redraw scheduled in {:?}", self.delay);
        (!skip_immediate).then_some(Quality::Low)
    }

    /// Returns [`Quality::High`] once when the pending deadline has passed.
    pub fn tick(&mut self, now: Instant) -> Option<Quality> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(Quality::High)
            }
            _ => None,
        }
    }

    /// Whether a high-quality frame is pending.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the pending frame, if any.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Drops the pending frame.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
