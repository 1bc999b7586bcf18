//! Wall-clock sampling.
//!
//! `WallClock` turns repeated wall-clock samples into whole-second deltas.
//! Scheduling jitter, background throttling and device sleep all collapse
//! into a larger delta on the next sample instead of lost time.

use serde::{Deserialize, Serialize};

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Delta source for the session timer.
///
/// The caller injects `now` on every call; the clock never reads system
/// time itself. Reading the sample, computing the delta and advancing the
/// reference happen in one synchronous step under `&mut`, so two tick
/// sources firing around the same instant can never consume overlapping
/// wall-clock ranges -- whichever runs first takes the delta and the other
/// becomes a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallClock {
    /// Epoch-ms reference for the next delta computation.
    last_sample_ms: u64,
}

impl WallClock {
    pub fn new(now_ms: u64) -> Self {
        Self {
            last_sample_ms: now_ms,
        }
    }

    /// Re-anchor the reference without consuming the gap since the last
    /// sample. Used when returning from the summary step, where elapsed
    /// time is charged to neither counter.
    pub fn resync(&mut self, now_ms: u64) {
        self.last_sample_ms = now_ms;
    }

    /// Consume the whole seconds elapsed since the last sample.
    ///
    /// The reference advances by the consumed seconds only, keeping the
    /// fractional-millisecond remainder for the next sample. A sample
    /// earlier than the reference (system clock stepped backward) yields 0
    /// and leaves the reference alone; the clock never runs backward.
    pub fn consume(&mut self, now_ms: u64) -> u64 {
        if now_ms < self.last_sample_ms {
            return 0;
        }
        let delta = (now_ms - self.last_sample_ms) / 1000;
        if delta >= 1 {
            self.last_sample_ms += delta * 1000;
        }
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_second_sample_is_a_no_op() {
        let mut clock = WallClock::new(10_000);
        assert_eq!(clock.consume(10_999), 0);
        assert_eq!(clock.consume(10_999), 0);
    }

    #[test]
    fn fractional_milliseconds_are_carried() {
        let mut clock = WallClock::new(10_000);
        // 1.5s elapsed: one second consumed, 500ms kept.
        assert_eq!(clock.consume(11_500), 1);
        // 600ms later the carried fraction tips the next second over.
        assert_eq!(clock.consume(12_100), 1);
    }

    #[test]
    fn large_gap_arrives_as_one_delta() {
        let mut clock = WallClock::new(0);
        assert_eq!(clock.consume(125_300), 125);
        assert_eq!(clock.consume(125_900), 0);
    }

    #[test]
    fn backward_clock_step_is_clamped() {
        let mut clock = WallClock::new(50_000);
        assert_eq!(clock.consume(40_000), 0);
        // Reference untouched: once the clock catches back up, only the
        // forward progress past the reference counts.
        assert_eq!(clock.consume(52_000), 2);
    }

    #[test]
    fn overlapping_tick_sources_never_double_count() {
        let mut clock = WallClock::new(0);
        // Scheduled tick and a visibility-change callback both sample the
        // same instant; the second consumer sees nothing.
        let first = clock.consume(3_000);
        let second = clock.consume(3_001);
        assert_eq!(first + second, 3);
    }

    #[test]
    fn resync_discards_the_gap() {
        let mut clock = WallClock::new(0);
        clock.resync(60_000);
        assert_eq!(clock.consume(61_000), 1);
    }
}
