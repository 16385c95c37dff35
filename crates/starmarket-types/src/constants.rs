//! The versioned bag of simulation tunables.
//!
//! [`SimulationConstants`] is an immutable snapshot. The core crate parses
//! it from the constants table and swaps whole snapshots between ticks;
//! nothing mutates a snapshot while a tick is running.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Fallback granularity when the configured one is not positive.
const FALLBACK_GRANULARITY: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Default lower price-band multiplier.
const DEFAULT_MIN_PRICE_MULTIPLIER: Decimal = Decimal::from_parts(3, 0, 0, false, 1);

/// Default upper price-band multiplier.
const DEFAULT_MAX_PRICE_MULTIPLIER: Decimal = Decimal::from_parts(3, 0, 0, false, 0);

/// Nanoseconds per second, for tick period conversion.
const NANOS_PER_SECOND: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Named numeric tunables consulted by every component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConstants {
    /// Incremented every time a new snapshot is loaded (0 = built-in defaults).
    pub version: u64,
    /// Real seconds per simulation tick.
    pub seconds_per_tick: Decimal,
    /// Minimum non-zero increment for amounts and prices.
    pub min_resource_share: Decimal,
    /// Fraction of the currency balance lost per tick.
    pub credit_decay_per_tick: Decimal,
    /// Fraction of each population resource lost per tick.
    pub population_decay_per_tick: Decimal,
    /// Ticks of consumption a planet wants in reserve (target).
    pub reserve_ticks_ahead: Decimal,
    /// Ticks of consumption below which stock is critical (warning).
    pub reserve_penalty_ticks_ahead: Decimal,
    /// Relative price drop per tick under surplus.
    pub price_decrease_per_tick: Decimal,
    /// Relative price rise per tick under deficit.
    pub price_increase_per_tick: Decimal,
    /// Galactic aggregation cadence in ticks.
    pub average_price_collect_ticks: u64,
    /// Lower price-band multiplier around the galactic price.
    pub min_price_multiplier: Decimal,
    /// Upper price-band multiplier around the galactic price.
    pub max_price_multiplier: Decimal,
    /// Maximum recipes a planet may start in a single tick.
    pub max_processes_per_tick: u32,
}

impl Default for SimulationConstants {
    fn default() -> Self {
        Self {
            version: 0,
            seconds_per_tick: Decimal::new(41, 1),
            min_resource_share: FALLBACK_GRANULARITY,
            credit_decay_per_tick: Decimal::new(1, 2),
            population_decay_per_tick: Decimal::new(5, 2),
            reserve_ticks_ahead: Decimal::new(150, 0),
            reserve_penalty_ticks_ahead: Decimal::new(75, 0),
            price_decrease_per_tick: Decimal::new(1, 2),
            price_increase_per_tick: Decimal::new(2, 2),
            average_price_collect_ticks: 20,
            min_price_multiplier: DEFAULT_MIN_PRICE_MULTIPLIER,
            max_price_multiplier: DEFAULT_MAX_PRICE_MULTIPLIER,
            max_processes_per_tick: 3,
        }
    }
}

impl SimulationConstants {
    /// Granularity step used for snapping (falls back to 0.001).
    pub fn granularity(&self) -> Decimal {
        if self.min_resource_share > Decimal::ZERO {
            self.min_resource_share
        } else {
            FALLBACK_GRANULARITY
        }
    }

    /// Tick period as a [`Duration`].
    ///
    /// Returns `None` (ticking disabled) for non-positive or sub-nanosecond
    /// periods.
    pub fn tick_period(&self) -> Option<Duration> {
        if self.seconds_per_tick <= Decimal::ZERO {
            return None;
        }
        let nanos = self
            .seconds_per_tick
            .checked_mul(NANOS_PER_SECOND)?
            .trunc()
            .to_u64()?;
        (nanos > 0).then(|| Duration::from_nanos(nanos))
    }

    /// Price band multipliers `(min, max)`.
    ///
    /// Non-positive multipliers fall back to 0.3 / 3, and a band with
    /// `max < min` is swapped rather than rejected.
    pub fn price_band(&self) -> (Decimal, Decimal) {
        let min = if self.min_price_multiplier > Decimal::ZERO {
            self.min_price_multiplier
        } else {
            DEFAULT_MIN_PRICE_MULTIPLIER
        };
        let max = if self.max_price_multiplier > Decimal::ZERO {
            self.max_price_multiplier
        } else {
            DEFAULT_MAX_PRICE_MULTIPLIER
        };
        if max < min { (max, min) } else { (min, max) }
    }

    /// Aggregation cadence, never below one tick.
    pub fn collect_cadence(&self) -> u64 {
        self.average_price_collect_ticks.max(1)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = SimulationConstants::default();
        assert_eq!(c.seconds_per_tick, dec!(4.1));
        assert_eq!(c.min_resource_share, dec!(0.001));
        assert_eq!(c.reserve_ticks_ahead, dec!(150));
        assert_eq!(c.min_price_multiplier, dec!(0.3));
        assert_eq!(c.max_price_multiplier, dec!(3));
        assert_eq!(c.average_price_collect_ticks, 20);
    }

    #[test]
    fn tick_period_converts_seconds() {
        let c = SimulationConstants::default();
        assert_eq!(c.tick_period(), Some(Duration::from_millis(4100)));
    }

    #[test]
    fn non_positive_period_disables_ticking() {
        let mut c = SimulationConstants::default();
        c.seconds_per_tick = Decimal::ZERO;
        assert_eq!(c.tick_period(), None);
        c.seconds_per_tick = dec!(-1);
        assert_eq!(c.tick_period(), None);
        c.seconds_per_tick = dec!(0.0000000001);
        assert_eq!(c.tick_period(), None);
    }

    #[test]
    fn inverted_band_is_swapped() {
        let mut c = SimulationConstants::default();
        c.min_price_multiplier = dec!(2);
        c.max_price_multiplier = dec!(0.5);
        assert_eq!(c.price_band(), (dec!(0.5), dec!(2)));
    }

    #[test]
    fn non_positive_band_falls_back() {
        let mut c = SimulationConstants::default();
        c.min_price_multiplier = Decimal::ZERO;
        c.max_price_multiplier = dec!(-1);
        assert_eq!(c.price_band(), (dec!(0.3), dec!(3)));
    }

    #[test]
    fn granularity_falls_back_when_zero() {
        let mut c = SimulationConstants::default();
        c.min_resource_share = Decimal::ZERO;
        assert_eq!(c.granularity(), dec!(0.001));
        assert_eq!(c.collect_cadence(), 20);
        c.average_price_collect_ticks = 0;
        assert_eq!(c.collect_cadence(), 1);
    }
}
