//! Leading-edge rate limiter.

use std::time::Duration;

use tokio::time::Instant;

/// Lets a signal through at most once per `interval`.
///
/// The first call always fires; later calls fire once `interval` has elapsed
/// since the last one that fired. A continuous flood therefore still fires
/// once per interval instead of being suppressed.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_fired: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
        }
    }

    /// Returns true (and records the firing) when the signal may go out now.
    pub fn try_fire(&mut self) -> bool {
        self.try_fire_at(Instant::now())
    }

    pub fn try_fire_at(&mut self, now: Instant) -> bool {
        let ready = self
            .last_fired
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval);
        if ready {
            self.last_fired = Some(now);
        }
        ready
    }

    /// Forget the last firing so the next call fires immediately.
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}
