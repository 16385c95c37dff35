//! Tick observer that logs periodic progress summaries.
//!
//! Emissions can batch several ticks, so a summary is logged whenever the
//! elapsed-tick counter crosses a multiple of the interval rather than when
//! it lands on one exactly. Each summary also counts resource rows held
//! below their warning level.

use starmarket_core::{Simulation, TickObserver, TickSummary};
use tracing::info;

/// Accumulates emission summaries and logs them every `interval` ticks.
#[derive(Debug, Clone, Default)]
pub struct SummaryLogger {
    interval: u64,
    last_logged_tick: u64,
    started: u64,
    completed: u64,
    collections: u64,
    clamped: usize,
}

impl SummaryLogger {
    /// Log every `interval` ticks; zero disables logging.
    pub const fn new(interval: u64) -> Self {
        Self {
            interval,
            last_logged_tick: 0,
            started: 0,
            completed: 0,
            collections: 0,
            clamped: 0,
        }
    }

    fn is_due(&self, elapsed_ticks: u64) -> bool {
        let window = |ticks: u64| ticks.checked_div(self.interval);
        match (window(self.last_logged_tick), window(elapsed_ticks)) {
            (Some(previous), Some(current)) => current > previous,
            _ => false,
        }
    }

    fn record(&mut self, summary: &TickSummary) {
        self.started = self.started.saturating_add(summary.processes_started);
        self.completed = self.completed.saturating_add(summary.processes_completed);
        self.clamped = self.clamped.saturating_add(summary.prices_clamped);
        if summary.market_collected {
            self.collections = self.collections.saturating_add(1);
        }
    }
}

/// Resource rows, across all planets, held below their warning level.
fn critical_resources(simulation: &Simulation) -> usize {
    simulation
        .planets()
        .flat_map(|planet| planet.resources())
        .filter(|row| row.is_critical())
        .count()
}

impl TickObserver for SummaryLogger {
    fn on_tick(&mut self, summary: &TickSummary, simulation: &Simulation) {
        if self.interval == 0 {
            return;
        }
        self.record(summary);
        if !self.is_due(summary.elapsed_ticks) {
            return;
        }

        let critical_resources = critical_resources(simulation);
        info!(
            elapsed_ticks = summary.elapsed_ticks,
            constants_version = summary.constants_version,
            planets = simulation.planets().count(),
            processes_started = self.started,
            processes_completed = self.completed,
            market_collections = self.collections,
            prices_clamped = self.clamped,
            critical_resources,
            "simulation progress"
        );
        *self = Self {
            last_logged_tick: summary.elapsed_ticks,
            ..Self::new(self.interval)
        };
    }
}
