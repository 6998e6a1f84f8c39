//! Fixed-rate wall-clock tick source.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What to do when the loop wakes up later than the tick deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickPolicy {
    /// Forget the missed ticks and schedule the next one from now.
    /// Countdowns run slow under load instead of bursting.
    #[default]
    Skip,
    /// Keep the original cadence: the next tick fires at its planned
    /// deadline even if that is already in the past, so missed ticks are
    /// made up in a burst and countdowns stay on wall-clock time.
    Drop,
}

/// Configuration for the tick clock.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Ticks per second. Default: 20, the usual game-server rate.
    pub tick_rate_hz: u32,
    /// Overrun handling.
    pub policy: TickPolicy,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 20,
            policy: TickPolicy::default(),
        }
    }
}

impl TickConfig {
    /// Maximum supported tick rate.
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    /// A config for a specific rate with the default policy.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    pub fn with_policy(mut self, policy: TickPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Clamps the rate into `1..=MAX_TICK_RATE_HZ`.
    ///
    /// Unlike a room loop, the engine always needs ticks: countdowns and
    /// request expiry are driven by them, so 0 is raised to 1.
    pub fn validated(mut self) -> Self {
        let clamped = self.tick_rate_hz.clamp(1, Self::MAX_TICK_RATE_HZ);
        if clamped != self.tick_rate_hz {
            warn!(
                rate = self.tick_rate_hz,
                clamped, "tick_rate_hz out of range, clamping"
            );
            self.tick_rate_hz = clamped;
        }
        self
    }

    /// Duration of one tick.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate_hz.max(1)))
    }
}

// ---------------------------------------------------------------------------
// TickInfo
// ---------------------------------------------------------------------------

/// Returned by [`TickClock::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// `true` if the loop woke up noticeably late.
    pub overrun: bool,
    /// Whole ticks that were skipped because of the overrun.
    pub ticks_skipped: u64,
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Fixed-rate tick source for the engine loop.
pub struct TickClock {
    policy: TickPolicy,
    tick_duration: Duration,
    tick_count: u64,
    next_tick: Instant,
}

impl TickClock {
    /// Creates a clock whose first tick is one tick duration from now.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();

        debug!(
            rate_hz = config.tick_rate_hz,
            policy = ?config.policy,
            "tick clock created"
        );

        Self {
            policy: config.policy,
            tick_duration,
            tick_count: 0,
            next_tick: Instant::now() + tick_duration,
        }
    }

    /// A clock for a specific rate with the default policy.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Waits until the next tick is due.
    ///
    /// Cancel-safe: if `tokio::select!` drops the future, the deadline is
    /// kept and the next call waits for the same tick.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let deadline = self.next_tick;
        time::sleep_until(deadline).await;

        let now = Instant::now();
        self.tick_count += 1;

        let late_by = now.saturating_duration_since(deadline);
        let overrun = late_by > self.tick_duration / 10;
        let mut ticks_skipped = 0;

        self.next_tick = match self.policy {
            TickPolicy::Skip => {
                if overrun {
                    ticks_skipped = (late_by.as_nanos() / self.tick_duration.as_nanos()) as u64;
                    if ticks_skipped > 0 {
                        warn!(
                            tick = self.tick_count,
                            skipped = ticks_skipped,
                            late_ms = late_by.as_secs_f64() * 1000.0,
                            "tick overrun, skipping ahead"
                        );
                    }
                }
                now + self.tick_duration
            }
            TickPolicy::Drop => deadline + self.tick_duration,
        };

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            overrun,
            ticks_skipped,
        }
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    pub fn policy(&self) -> TickPolicy {
        self.policy
    }
}
