use std::time::{Duration, Instant};

/// Tick interval for a target frame rate, clamped to at least one millisecond.
pub fn interval_for_fps(fps: u32) -> Duration {
    let ms = 1000 / fps.max(1);
    Duration::from_millis(u64::from(ms.max(1)))
}

/// Periodic deadline generator.
///
/// Disarmed by default. Once armed, [`poll`](Self::poll) reports at most one
/// due tick per call no matter how many intervals elapsed, so a stalled loop
/// never sees a burst of stale ticks.
#[derive(Debug, Clone, Default)]
pub struct TickClock {
    interval: Option<Duration>,
    next: Option<Instant>,
}

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the clock with `interval` starting at `now`, or disarms it.
    pub fn set(&mut self, interval: Option<Duration>, now: Instant) {
        self.interval = interval;
        self.next = interval.map(|i| now + i);
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Time left until the next tick, `None` when disarmed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.next.map(|next| next.saturating_duration_since(now))
    }

    /// Returns `true` if a tick is due and schedules the following one.
    pub fn poll(&mut self, now: Instant) -> bool {
        match (self.next, self.interval) {
            (Some(next), Some(interval)) if now >= next => {
                let mut following = next + interval;
                if following <= now {
                    following = now + interval;
                }
                self.next = Some(following);
                true
            }
            _ => false,
        }
    }
}
