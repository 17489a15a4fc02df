// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::thread;
use std::time::{Duration, Instant};

/// Spacing between batch lookups when the config does not set one.
pub const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_millis(100);

/// Fixed-interval gate: two admitted calls never start closer than `interval`.
///
/// The policy half (`delay_at`/`admit_at`) is pure over an `Instant` so it
/// can be exercised without sleeping; `wait` applies it to the wall clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Throttle {
    interval: Duration,
    last_admitted: Option<Instant>,
}

impl Throttle {
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_admitted: None,
        }
    }

    pub const fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay_at(&self, now: Instant) -> Duration {
        match self.last_admitted {
            Some(last) => (last + self.interval).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    /// Books the next slot at or after `now` and returns how long to hold off.
    pub fn admit_at(&mut self, now: Instant) -> Duration {
        let delay = self.delay_at(now);
        self.last_admitted = Some(now + delay);
        delay
    }

    pub fn wait(&mut self) -> Duration {
        let delay = self.admit_at(Instant::now());
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        delay
    }
}
