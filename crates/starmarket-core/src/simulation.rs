//! [`Simulation`]: the facade collaborators drive and read.
//!
//! The simulation owns the clock, the catalogs, the constants snapshot,
//! every registered planet, the galactic market, and the observer list.
//! Every mutating operation takes `&mut self`, so registration, reloads,
//! and subscriptions can only happen between ticks, never during one.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use starmarket_catalog::{CatalogSet, PlanetCatalog, PlanetRecord, RecipeCatalog, ResourceCatalog};
use starmarket_economy::PlanetEconomy;
use starmarket_types::{
    PlanetHandle, PlanetId, ProcessSlot, ResourceState, SimulationConstants, SimulationSnapshot,
    SubscriptionId,
};
use tracing::{info, warn};

use crate::clock::SimulationClock;
use crate::config::{ConfigError, ConstantsSource};
use crate::market::GalacticMarket;
use crate::observer::{ObserverRegistry, TickObserver};
use crate::tick::{self, TickContext, TickSummary};

/// The planetary economic simulation.
pub struct Simulation {
    clock: SimulationClock,
    constants: Arc<SimulationConstants>,
    constants_source: Box<dyn ConstantsSource>,
    resources: ResourceCatalog,
    recipes: RecipeCatalog,
    planets: BTreeMap<PlanetHandle, PlanetEconomy>,
    market: GalacticMarket,
    observers: ObserverRegistry,
}

impl core::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Simulation")
            .field("clock", &self.clock)
            .field("constants_version", &self.constants.version)
            .field("constants_source", &self.constants_source.describe())
            .field("planets", &self.planets.len())
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Create a simulation with no planets.
    ///
    /// Constants are loaded from `constants_source`; if that fails the
    /// built-in defaults are used (version 0). The clock starts stopped.
    pub fn new(
        resources: ResourceCatalog,
        recipes: RecipeCatalog,
        constants_source: Box<dyn ConstantsSource>,
    ) -> Self {
        let constants = match constants_source.load() {
            Ok(mut loaded) => {
                loaded.version = 1;
                loaded
            }
            Err(error) => {
                warn!(
                    source = %constants_source.describe(),
                    error = %error,
                    "constants unavailable, using built-in defaults"
                );
                SimulationConstants::default()
            }
        };
        info!(
            resources = resources.len(),
            recipes = recipes.len(),
            constants_version = constants.version,
            tick_period = ?constants.tick_period(),
            "simulation created"
        );

        Self {
            clock: SimulationClock::from_constants(&constants),
            market: GalacticMarket::new(&resources),
            constants: Arc::new(constants),
            constants_source,
            resources,
            recipes,
            planets: BTreeMap::new(),
            observers: ObserverRegistry::default(),
        }
    }

    /// Create a simulation from loaded catalogs and register every planet.
    pub fn from_catalogs(catalogs: CatalogSet, constants_source: Box<dyn ConstantsSource>) -> Self {
        let mut simulation = Self::new(catalogs.resources, catalogs.recipes, constants_source);
        simulation.register_catalog(&catalogs.planets);
        simulation
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Start the clock.
    pub fn start(&mut self) {
        self.clock.start();
        info!(elapsed_ticks = self.clock.elapsed_ticks(), "simulation started");
    }

    /// Stop the clock. Pending time is kept.
    pub fn stop(&mut self) {
        self.clock.stop();
        info!(elapsed_ticks = self.clock.elapsed_ticks(), "simulation stopped");
    }

    /// Whether the clock is running.
    pub const fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Feed elapsed time into the clock and run any ticks it completes.
    ///
    /// Returns the summary of the emission, or `None` when no tick elapsed.
    /// Observers are notified before this returns.
    pub fn advance_clock(&mut self, delta: Duration) -> Option<TickSummary> {
        let tick_count = self.clock.advance(delta)?;
        let context = TickContext {
            resources: &self.resources,
            recipes: &self.recipes,
            constants: self.constants.as_ref(),
        };
        let summary = tick::run_tick(
            &mut self.planets,
            &mut self.market,
            context,
            tick_count,
            self.clock.elapsed_ticks(),
        );

        let mut observers = std::mem::take(&mut self.observers);
        observers.notify(&summary, self);
        // Observers cannot subscribe from inside a notification, so the
        // registry taken above is still the complete list.
        self.observers = observers;

        Some(summary)
    }

    // -----------------------------------------------------------------------
    // Planets
    // -----------------------------------------------------------------------

    /// Register a planet built from `record` under `planet_id`.
    pub fn register_planet(&mut self, planet_id: PlanetId, record: &PlanetRecord) -> PlanetHandle {
        let handle = PlanetHandle::new();
        let planet = PlanetEconomy::new(handle, planet_id, record, &self.resources, &self.constants);
        info!(
            planet = %planet.planet_id(),
            %handle,
            slots = planet.slots().len(),
            initialized = planet.is_initialized(),
            "planet registered"
        );
        self.planets.insert(handle, planet);
        handle
    }

    /// Register every planet of a catalog, in table order.
    pub fn register_catalog(&mut self, planets: &PlanetCatalog) -> Vec<PlanetHandle> {
        planets
            .iter()
            .map(|record| self.register_planet(record.id.clone(), record))
            .collect()
    }

    /// Remove a planet. Returns `false` if the handle is unknown.
    pub fn unregister_planet(&mut self, handle: PlanetHandle) -> bool {
        let removed = self.planets.remove(&handle);
        if let Some(planet) = &removed {
            info!(planet = %planet.planet_id(), %handle, "planet unregistered");
        }
        removed.is_some()
    }

    /// Look up a planet.
    pub fn planet(&self, handle: PlanetHandle) -> Option<&PlanetEconomy> {
        self.planets.get(&handle)
    }

    /// Planets in registration order.
    pub fn planets(&self) -> impl Iterator<Item = &PlanetEconomy> {
        self.planets.values()
    }

    /// Copy of a planet's resource rows.
    pub fn resource_snapshot(&self, handle: PlanetHandle) -> Option<Vec<ResourceState>> {
        self.planet(handle).map(|planet| planet.resources().to_vec())
    }

    /// Copy of a planet's production slots.
    pub fn slot_snapshot(&self, handle: PlanetHandle) -> Option<Vec<ProcessSlot>> {
        self.planet(handle).map(|planet| planet.slots().to_vec())
    }

    /// Copy of the whole simulation state.
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            captured_at: Utc::now(),
            elapsed_ticks: self.clock.elapsed_ticks(),
            constants_version: self.constants.version,
            planets: self.planets.values().map(PlanetEconomy::snapshot).collect(),
            galactic_prices: self.market.entries().to_vec(),
        }
    }

    // -----------------------------------------------------------------------
    // Market
    // -----------------------------------------------------------------------

    /// Galactic price of a resource; see [`GalacticMarket::galactic_price`].
    pub fn galactic_price(&self, resource_id: &str) -> Option<Decimal> {
        self.market.galactic_price(resource_id, &self.resources)
    }

    /// The galactic market.
    pub const fn market(&self) -> &GalacticMarket {
        &self.market
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Constants snapshot in effect.
    pub fn constants(&self) -> &SimulationConstants {
        &self.constants
    }

    /// The clock.
    pub const fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Resource catalog.
    pub const fn resources(&self) -> &ResourceCatalog {
        &self.resources
    }

    /// Recipe catalog.
    pub const fn recipes(&self) -> &RecipeCatalog {
        &self.recipes
    }

    /// Reload constants from the constants source.
    ///
    /// On success the new snapshot replaces the old one wholesale, the tick
    /// period is updated, and the new version is returned. On failure the
    /// previous snapshot stays in effect.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] reported by the constants source.
    pub fn reload_constants(&mut self) -> Result<u64, ConfigError> {
        let mut loaded = match self.constants_source.load() {
            Ok(loaded) => loaded,
            Err(error) => {
                warn!(
                    source = %self.constants_source.describe(),
                    error = %error,
                    version = self.constants.version,
                    "constants reload failed, keeping previous snapshot"
                );
                return Err(error);
            }
        };
        loaded.version = self.constants.version.saturating_add(1);
        self.clock.set_period(loaded.tick_period());
        let version = loaded.version;
        self.constants = Arc::new(loaded);
        info!(version, "constants reloaded");
        Ok(version)
    }

    /// Replace the recipe catalog.
    ///
    /// Running processes keep going; one whose recipe is gone frees its slot
    /// without output when it completes.
    pub fn reload_recipes(&mut self, recipes: RecipeCatalog) {
        info!(previous = self.recipes.len(), recipes = recipes.len(), "recipes reloaded");
        self.recipes = recipes;
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Subscribe an observer to tick summaries.
    pub fn subscribe(&mut self, observer: Box<dyn TickObserver>) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    /// Remove an observer. Returns `false` if the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }
}
