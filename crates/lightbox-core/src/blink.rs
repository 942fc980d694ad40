//! Blink visibility schedule.
//!
//! A blinking layer is driven by a fixed-rate timer: the first tick fires
//! after a start delay, then one tick per period. On tick `t` the layer is
//! shown when `t % interval == 0` and hidden otherwise. Before the first tick
//! a blinking layer is hidden.

use std::time::Duration;

use crate::FilterConfig;

/// Delay before the first tick.
pub const START_DELAY: Duration = Duration::from_millis(2000);

/// Time between ticks.
pub const TICK: Duration = Duration::from_millis(700);

/// When a blinking layer is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkSchedule {
    interval: u32,
    tick: Duration,
    start_delay: Duration,
}

impl BlinkSchedule {
    /// Schedule with the default timer; `interval` is clamped to at least 1.
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            tick: TICK,
            start_delay: START_DELAY,
        }
    }

    /// Schedule for a layer's filter configuration.
    pub fn for_filter(filter: &FilterConfig) -> Self {
        Self::new(filter.blink_interval_seconds)
    }

    /// Override the tick length and start delay.
    pub fn with_timing(self, tick: Duration, start_delay: Duration) -> Self {
        Self {
            tick,
            start_delay,
            ..self
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Index of the most recent tick, or `None` before the first one.
    pub fn tick_at(&self, elapsed: Duration) -> Option<u64> {
        let since_start = elapsed.checked_sub(self.start_delay)?;
        if self.tick.is_zero() {
            return Some(0);
        }
        Some((since_start.as_nanos() / self.tick.as_nanos()) as u64)
    }

    /// Whether a blinking layer is shown at `elapsed` since the timer started.
    pub fn is_shown(&self, elapsed: Duration) -> bool {
        self.tick_at(elapsed)
            .is_some_and(|tick| tick % u64::from(self.interval) == 0)
    }
}

/// Whether a layer with `filter` is visible at `elapsed`.
///
/// Layers that do not blink are always visible.
pub fn is_visible(filter: &FilterConfig, elapsed: Duration) -> bool {
    !filter.blinking || BlinkSchedule::for_filter(filter).is_shown(elapsed)
}
