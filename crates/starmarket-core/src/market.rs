//! Galactic market: galaxy-wide smoothed prices and the price band.
//!
//! Every `average_price_collect_ticks` ticks the market averages each
//! resource's positive local prices over all planets, smooths the average
//! with the previous galactic price, and derives a band
//! `[g * min_multiplier, g * max_multiplier]` around the result. Planets
//! then clamp their local prices into that band.
//!
//! The currency is exempt: its galactic price is always its base price and
//! it is never clamped.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use starmarket_catalog::ResourceCatalog;
use starmarket_economy::{PlanetEconomy, PriceBand};
use starmarket_types::quantity::{scale, snap_price};
use starmarket_types::{GalacticPriceEntry, ResourceId, ResourceRole, SimulationConstants};
use tracing::debug;

/// Galaxy-wide price entries, one per catalog resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalacticMarket {
    entries: Vec<GalacticPriceEntry>,
    index: BTreeMap<ResourceId, usize>,
    /// Ticks accumulated since the last aggregation.
    pending_ticks: u64,
}

impl GalacticMarket {
    /// Create entries for every catalog resource.
    ///
    /// The currency starts pinned at its base price; everything else starts
    /// unsampled at zero.
    pub fn new(resources: &ResourceCatalog) -> Self {
        let mut market = Self::default();
        for definition in resources.iter() {
            let mut entry = GalacticPriceEntry::unsampled(definition.id.clone());
            if definition.role == ResourceRole::Currency {
                entry.last_price = definition.base_cost;
                entry.current_price = definition.base_cost;
            }
            market
                .index
                .insert(definition.id.clone(), market.entries.len());
            market.entries.push(entry);
        }
        market
    }

    /// Entries in catalog order.
    pub fn entries(&self) -> &[GalacticPriceEntry] {
        &self.entries
    }

    /// Look up one entry.
    pub fn entry(&self, id: &str) -> Option<&GalacticPriceEntry> {
        self.index.get(id).and_then(|&position| self.entries.get(position))
    }

    /// Ticks accumulated toward the next aggregation.
    pub const fn pending_ticks(&self) -> u64 {
        self.pending_ticks
    }

    /// Galactic price of a resource.
    ///
    /// The current smoothed price, else the last one, else the catalog base
    /// price for a resource that was never sampled. `None` for resources
    /// outside the catalog.
    pub fn galactic_price(&self, id: &str, resources: &ResourceCatalog) -> Option<Decimal> {
        let definition = resources.get(id)?;
        Some(
            self.entry(id)
                .and_then(GalacticPriceEntry::reference_price)
                .unwrap_or(definition.base_cost),
        )
    }

    /// Count `ticks` toward the cadence and report whether aggregation is due.
    ///
    /// The remainder beyond the cadence carries over to the next window. A
    /// batched emission spanning several windows aggregates once.
    pub fn is_due(&mut self, ticks: u64, constants: &SimulationConstants) -> bool {
        let cadence = constants.collect_cadence();
        self.pending_ticks = self.pending_ticks.saturating_add(ticks);
        if self.pending_ticks < cadence {
            return false;
        }
        self.pending_ticks = self.pending_ticks.checked_rem(cadence).unwrap_or(0);
        true
    }

    /// Recompute smoothed prices from the planets' local prices.
    ///
    /// Returns the number of resources that received samples.
    pub fn aggregate<'a>(
        &mut self,
        planets: impl IntoIterator<Item = &'a PlanetEconomy>,
        resources: &ResourceCatalog,
        constants: &SimulationConstants,
    ) -> usize {
        let mut samples: BTreeMap<&str, (Decimal, u64)> = BTreeMap::new();
        for planet in planets {
            for row in planet.resources() {
                if row.current_price <= Decimal::ZERO {
                    continue;
                }
                let (sum, count) = samples.entry(row.id.as_str()).or_insert((Decimal::ZERO, 0));
                *sum = sum.saturating_add(row.current_price);
                *count = count.saturating_add(1);
            }
        }

        let step = constants.granularity();
        let mut sampled: usize = 0;
        for entry in &mut self.entries {
            let Some(definition) = resources.get(entry.resource_id.as_str()) else {
                continue;
            };
            if definition.role.is_price_pinned() {
                entry.last_price = definition.base_cost;
                entry.current_price = definition.base_cost;
                continue;
            }
            let Some(&(sum, count)) = samples.get(entry.resource_id.as_str()) else {
                continue;
            };
            let Some(average) = sum.checked_div(Decimal::from(count)) else {
                continue;
            };
            let smoothed = if entry.current_price > Decimal::ZERO {
                entry
                    .current_price
                    .saturating_add(average)
                    .checked_div(Decimal::TWO)
                    .unwrap_or(average)
            } else {
                average
            };
            entry.last_price = entry.current_price;
            entry.current_price = snap_price(smoothed, step);
            sampled = sampled.saturating_add(1);
        }

        debug!(sampled, "galactic prices aggregated");
        sampled
    }

    /// Price bands for every non-currency resource with a galactic price.
    pub fn bands(
        &self,
        resources: &ResourceCatalog,
        constants: &SimulationConstants,
    ) -> BTreeMap<ResourceId, PriceBand> {
        let (min_multiplier, max_multiplier) = constants.price_band();
        self.entries
            .iter()
            .filter(|entry| {
                resources
                    .get(entry.resource_id.as_str())
                    .is_some_and(|definition| !definition.role.is_price_pinned())
            })
            .filter_map(|entry| {
                let reference = entry.reference_price()?;
                let band = PriceBand {
                    min: scale(reference, min_multiplier),
                    max: scale(reference, max_multiplier),
                };
                Some((entry.resource_id.clone(), band))
            })
            .collect()
    }
}
