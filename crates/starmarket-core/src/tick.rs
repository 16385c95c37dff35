//! Tick cycle: one clock emission applied to every planet and the market.
//!
//! Each emission of `n` ticks runs two phases:
//!
//! 1. **Planets** -- every registered planet advances by `n` ticks, in
//!    registration order.
//! 2. **Market** -- when the aggregation cadence is reached, galactic prices
//!    are recomputed and every planet's local prices are clamped into the
//!    resulting bands.
//!
//! Both phases finish before the call returns, so observers and the next
//! emission always see a consistent state.

use std::collections::BTreeMap;

use serde::Serialize;
use starmarket_catalog::{RecipeCatalog, ResourceCatalog};
use starmarket_economy::PlanetEconomy;
use starmarket_types::{PlanetHandle, SimulationConstants};
use tracing::{debug, info};

use crate::market::GalacticMarket;

/// Read-only inputs shared by every phase of a tick.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Resource catalog.
    pub resources: &'a ResourceCatalog,
    /// Recipe catalog.
    pub recipes: &'a RecipeCatalog,
    /// Constants snapshot in effect for this tick.
    pub constants: &'a SimulationConstants,
}

/// Summary of one clock emission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// Ticks applied in this emission (at least one).
    pub tick_count: u64,
    /// Clock elapsed-tick counter after this emission.
    pub elapsed_ticks: u64,
    /// Constants version the emission ran with.
    pub constants_version: u64,
    /// Initialized planets that advanced.
    pub planets_ticked: usize,
    /// Recipes that delivered outputs.
    pub processes_completed: u64,
    /// Recipes started.
    pub processes_started: u64,
    /// Whether galactic prices were aggregated.
    pub market_collected: bool,
    /// Local prices moved by the galactic band.
    pub prices_clamped: usize,
}

/// Apply one clock emission of `tick_count` ticks.
pub fn run_tick(
    planets: &mut BTreeMap<PlanetHandle, PlanetEconomy>,
    market: &mut GalacticMarket,
    context: TickContext<'_>,
    tick_count: u64,
    elapsed_ticks: u64,
) -> TickSummary {
    let mut summary = TickSummary {
        tick_count,
        elapsed_ticks,
        constants_version: context.constants.version,
        ..TickSummary::default()
    };

    // Phase 1: planets.
    for planet in planets.values_mut() {
        if !planet.is_initialized() {
            continue;
        }
        let report = planet.on_tick(tick_count, context.recipes, context.constants);
        summary.planets_ticked = summary.planets_ticked.saturating_add(1);
        summary.processes_completed = summary
            .processes_completed
            .saturating_add(u64::from(report.completed));
        summary.processes_started = summary
            .processes_started
            .saturating_add(u64::from(report.started));
    }

    // Phase 2: market.
    if market.is_due(tick_count, context.constants) {
        market.aggregate(planets.values(), context.resources, context.constants);
        let bands = market.bands(context.resources, context.constants);
        for planet in planets.values_mut() {
            summary.prices_clamped = summary
                .prices_clamped
                .saturating_add(planet.clamp_prices(&bands));
        }
        summary.market_collected = true;
        info!(
            elapsed_ticks,
            bands = bands.len(),
            prices_clamped = summary.prices_clamped,
            "galactic market collected"
        );
    }

    debug!(
        tick_count,
        elapsed_ticks,
        planets = summary.planets_ticked,
        started = summary.processes_started,
        completed = summary.processes_completed,
        "tick applied"
    );
    summary
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use starmarket_catalog::recipe::RecipeRecord;
    use starmarket_catalog::resource::ResourceRecord;
    use starmarket_catalog::{PlanetProfile, PlanetRecord, ResourceRoles};
    use starmarket_types::{PlanetId, ResourceId};

    use super::*;

    fn resources() -> ResourceCatalog {
        let record = |id: &str, cost: Decimal| ResourceRecord {
            id: ResourceId::from(id),
            name: None,
            base_cost: cost,
            role: None,
        };
        ResourceCatalog::from_records(
            vec![record("PR_Credits", dec!(1)), record("PR_Food", dec!(10))],
            &ResourceRoles::default(),
        )
    }

    fn hungry_planet(catalog: &ResourceCatalog, profile: bool) -> PlanetEconomy {
        let record = PlanetRecord {
            id: PlanetId::from("P_Hungry"),
            planet_type: "Rocky".to_owned(),
            start_resources: BTreeMap::from([(ResourceId::from("PR_Food"), dec!(100))]),
            scale: Decimal::ONE,
            color: "#FFFFFF".to_owned(),
            profile: profile.then(|| PlanetProfile {
                consumption: BTreeMap::from([(ResourceId::from("PR_Food"), dec!(1))]),
                ..PlanetProfile::default()
            }),
        };
        PlanetEconomy::new(
            PlanetHandle::new(),
            PlanetId::from("P_Hungry"),
            &record,
            catalog,
            &SimulationConstants::default(),
        )
    }

    #[test]
    fn planets_tick_and_market_waits_for_cadence() {
        let catalog = resources();
        let recipes = RecipeCatalog::from_records(Vec::<RecipeRecord>::new());
        let constants = SimulationConstants::default();
        let context = TickContext {
            resources: &catalog,
            recipes: &recipes,
            constants: &constants,
        };

        let mut planets = BTreeMap::new();
        let live = hungry_planet(&catalog, true);
        let dormant = hungry_planet(&catalog, false);
        planets.insert(live.handle(), live);
        planets.insert(dormant.handle(), dormant);
        let mut market = GalacticMarket::new(&catalog);

        let summary = run_tick(&mut planets, &mut market, context, 1, 1);
        assert_eq!(summary.planets_ticked, 1);
        assert!(!summary.market_collected);

        let summary = run_tick(&mut planets, &mut market, context, 19, 20);
        assert!(summary.market_collected);
        assert!(market.entry("PR_Food").is_some_and(|e| e.current_price > Decimal::ZERO));
        assert_eq!(summary.constants_version, 0);
    }

    #[test]
    fn band_pulls_outlier_prices_in() {
        let catalog = resources();
        let recipes = RecipeCatalog::default();
        let mut constants = SimulationConstants::default();
        constants.average_price_collect_ticks = 1;
        constants.max_price_multiplier = dec!(1.1);
        let context = TickContext {
            resources: &catalog,
            recipes: &recipes,
            constants: &constants,
        };

        let mut planets = BTreeMap::new();
        let mut cheap = hungry_planet(&catalog, false);
        let mut dear = hungry_planet(&catalog, false);
        cheap.set_price("PR_Food", dec!(10), &constants);
        dear.set_price("PR_Food", dec!(30), &constants);
        let dear_handle = dear.handle();
        planets.insert(cheap.handle(), cheap);
        planets.insert(dear_handle, dear);
        let mut market = GalacticMarket::new(&catalog);

        let summary = run_tick(&mut planets, &mut market, context, 1, 1);
        assert!(summary.market_collected);
        assert_eq!(summary.prices_clamped, 1);
        // Galactic price 20, band [6, 22].
        let price = planets
            .get(&dear_handle)
            .and_then(|p| p.resource("PR_Food"))
            .map(|r| r.current_price);
        assert_eq!(price, Some(dec!(22.0)));
    }
}
