// Monotonic-counter delta tracking (instantaneous rates from two samples)

use std::sync::Mutex;
use std::time::Instant;

/// Turns a pair of monotonically increasing counters into instantaneous
/// rates by retaining exactly one prior sample. The read-modify-write of
/// the baseline happens under one lock so concurrent pollers never compute
/// a rate against a torn prior/current pair.
pub struct RateTracker {
    last: Mutex<Option<(u64, u64, Instant)>>,
}

impl Default for RateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RateTracker {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }

    /// Compute per-second rates for both counters and advance the baseline
    /// to the current reading.
    ///
    /// The first call stores the baseline and reports (0.0, 0.0): a delta
    /// needs a prior sample, and that is defined boundary behavior, not an
    /// error. The interval is floored to one second so rapid repeated polls
    /// never divide by zero, and a counter that appears to have decreased
    /// (reset, process restart) clamps its delta to zero.
    pub fn rate(&self, a: u64, b: u64, now: Instant) -> (f64, f64) {
        let Ok(mut guard) = self.last.lock() else {
            return (0.0, 0.0);
        };
        let rates = match *guard {
            None => (0.0, 0.0),
            Some((prev_a, prev_b, prev_ts)) => {
                let elapsed = now.duration_since(prev_ts).as_secs_f64().max(1.0);
                (
                    a.saturating_sub(prev_a) as f64 / elapsed,
                    b.saturating_sub(prev_b) as f64 / elapsed,
                )
            }
        };
        *guard = Some((a, b, now));
        rates
    }

    /// Last stored baseline counters, if any (for tests and debugging).
    pub fn last_sample(&self) -> Option<(u64, u64)> {
        self.last
            .lock()
            .ok()
            .and_then(|guard| guard.map(|(a, b, _)| (a, b)))
    }
}
