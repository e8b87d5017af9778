//! Fixed-interval tick schedule.

use std::time::{Duration, Instant};

/// Yields the elapsed show time once per interval.
///
/// Tick `i` is due at `start + i * interval`, measured on the monotonic
/// clock, so a slow tick delays the next one without shifting the ones
/// after it. The first tick is immediate. The iterator sleeps until a tick
/// is due and ends once the optional `end` is reached.
#[derive(Debug)]
pub struct Ticker {
    start: Instant,
    interval: Duration,
    end: Option<Duration>,
    index: u32,
}

impl Ticker {
    /// A zero interval is raised to one millisecond.
    pub fn new(interval: Duration) -> Self {
        Self {
            start: Instant::now(),
            interval: interval.max(Duration::from_millis(1)),
            end: None,
            index: 0,
        }
    }

    /// Stop before the first tick due at or after `end`.
    pub fn with_end(mut self, end: Duration) -> Self {
        self.end = Some(end);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Offset of the next tick from the start of the schedule.
    fn next_due(&self) -> Option<Duration> {
        self.interval.checked_mul(self.index)
    }
}

impl Iterator for Ticker {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let due = self.next_due()?;
        if self.end.is_some_and(|end| due >= end) {
            return None;
        }
        let elapsed = self.start.elapsed();
        if let Some(wait) = due.checked_sub(elapsed) {
            std::thread::sleep(wait);
        }
        self.index = self.index.checked_add(1)?;
        Some(self.start.elapsed())
    }
}
