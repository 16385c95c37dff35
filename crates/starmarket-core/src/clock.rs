//! Simulation clock: turns elapsed time into whole ticks.
//!
//! The clock accumulates time in integer nanoseconds. When the accumulator
//! covers at least one tick period it emits `floor(acc / period)` ticks and
//! keeps the remainder, so no time is lost or counted twice across frames.
//!
//! The clock is an owned service with an explicit lifecycle: a new clock is
//! stopped, and nothing accumulates until [`SimulationClock::start`].

use std::time::Duration;

use starmarket_types::SimulationConstants;

/// Converts accumulated time into discrete ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationClock {
    /// Tick period; `None` disables ticking.
    period: Option<Duration>,
    /// Time accumulated toward the next tick, in nanoseconds.
    pending_nanos: u128,
    /// Ticks emitted since construction (saturating).
    elapsed_ticks: u64,
    /// Whether `advance` accumulates time.
    running: bool,
}

impl SimulationClock {
    /// Create a stopped clock with the given period.
    ///
    /// A zero period disables ticking, like `None`.
    pub fn new(period: Option<Duration>) -> Self {
        Self {
            period: period.filter(|p| !p.is_zero()),
            pending_nanos: 0,
            elapsed_ticks: 0,
            running: false,
        }
    }

    /// Create a stopped clock using the period from `constants`.
    pub fn from_constants(constants: &SimulationConstants) -> Self {
        Self::new(constants.tick_period())
    }

    /// Begin accumulating time.
    pub const fn start(&mut self) {
        self.running = true;
    }

    /// Stop accumulating time. Pending time is kept.
    pub const fn stop(&mut self) {
        self.running = false;
    }

    /// Whether the clock is running.
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Replace the tick period.
    ///
    /// Takes effect at the next [`advance`](Self::advance); time already
    /// pending is not rescaled.
    pub fn set_period(&mut self, period: Option<Duration>) {
        self.period = period.filter(|p| !p.is_zero());
    }

    /// Current tick period.
    pub const fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Ticks emitted so far.
    pub const fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    /// Time accumulated toward the next tick.
    pub fn pending(&self) -> Duration {
        let nanos = u64::try_from(self.pending_nanos).unwrap_or(u64::MAX);
        Duration::from_nanos(nanos)
    }

    /// Feed `delta` of elapsed time into the clock.
    ///
    /// Returns the number of whole ticks that elapsed (at least one), or
    /// `None` when the frame completed no tick, the clock is stopped, or
    /// ticking is disabled.
    pub fn advance(&mut self, delta: Duration) -> Option<u64> {
        if !self.running {
            return None;
        }
        let period = self.period?.as_nanos();

        self.pending_nanos = self.pending_nanos.saturating_add(delta.as_nanos());
        if self.pending_nanos < period {
            return None;
        }

        let ticks = self.pending_nanos.checked_div(period)?;
        self.pending_nanos = self.pending_nanos.checked_rem(period)?;
        let ticks = u64::try_from(ticks).unwrap_or(u64::MAX);
        self.elapsed_ticks = self.elapsed_ticks.saturating_add(ticks);
        Some(ticks)
    }
}
